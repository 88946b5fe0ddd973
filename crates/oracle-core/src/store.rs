//! Knowledge base persistence
//!
//! The whole knowledge base is one binary image:
//!
//! ```text
//! "ORKB" | version (u8) | bincode { records, pending_success, pending_failure }
//! ```
//!
//! Writes go to a sibling temp file that is renamed over the target, so a
//! reader sees either the previous image or the new one. A missing store is
//! a first run; a store that fails to decode or is internally inconsistent
//! is discarded rather than partially trusted.

use crate::error::StoreError;
use crate::knowledge::{ComponentRecord, KnowledgeBase};
use crate::relation::{Polarity, RelationGraph};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const MAGIC: &[u8; 4] = b"ORKB";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1;

#[derive(Serialize)]
struct ImageRef<'a> {
    records: Vec<&'a ComponentRecord>,
    pending_success: &'a RelationGraph,
    pending_failure: &'a RelationGraph,
}

#[derive(Deserialize)]
struct Image {
    records: Vec<ComponentRecord>,
    pending_success: RelationGraph,
    pending_failure: RelationGraph,
}

/// Encode the knowledge base into its store image
///
/// # Errors
/// [`StoreError::Encode`] if serialization fails
pub fn encode(kb: &KnowledgeBase) -> Result<Vec<u8>, StoreError> {
    let image = ImageRef {
        records: kb.records().collect(),
        pending_success: kb.graph(Polarity::Success),
        pending_failure: kb.graph(Polarity::Failure),
    };
    let body = bincode::serialize(&image)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a store image
///
/// # Errors
/// [`StoreError::Corrupt`] for a bad header or undecodable body,
/// [`StoreError::Inconsistent`] when records and relations disagree.
/// `path` is only used for the message.
pub fn decode(bytes: &[u8], path: &Path) -> Result<KnowledgeBase, StoreError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(StoreError::corrupt(path, "missing store header"));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(StoreError::corrupt(path, format!("unsupported format version {version}")));
    }
    let body = &bytes[HEADER_LEN..];

    let image: Image = bincode::deserialize(body).map_err(|e| StoreError::corrupt(path, e.to_string()))?;
    KnowledgeBase::from_parts(image.records, image.pending_success, image.pending_failure)
        .map_err(|source| StoreError::Inconsistent {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the knowledge base to `path` as one atomic unit
///
/// # Errors
/// [`StoreError::Io`] or [`StoreError::Encode`]
pub fn persist(kb: &KnowledgeBase, path: &Path) -> Result<(), StoreError> {
    let bytes = encode(kb)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes).map_err(|e| StoreError::io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io_error(path, e))?;

    tracing::info!(path = %path.display(), components = kb.len(), bytes = bytes.len(), "save complete");
    Ok(())
}

/// Load the knowledge base, surfacing every failure
///
/// A missing file is not a failure: it yields an empty knowledge base.
///
/// # Errors
/// [`StoreError::Io`] for unreadable files, [`StoreError::Corrupt`] or
/// [`StoreError::Inconsistent`] for unusable images.
pub fn restore_strict(path: &Path) -> Result<KnowledgeBase, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no store found, starting empty");
            return Ok(KnowledgeBase::new());
        }
        Err(e) => return Err(StoreError::io_error(path, e)),
    };
    let kb = decode(&bytes, path)?;
    tracing::info!(path = %path.display(), components = kb.len(), "load complete");
    Ok(kb)
}

/// Load the knowledge base, starting empty on any failure
///
/// Corrupt or unreadable stores are logged and treated as no prior history.
#[must_use]
pub fn restore(path: &Path) -> KnowledgeBase {
    restore_strict(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "discarding unusable store");
        KnowledgeBase::new()
    })
}
