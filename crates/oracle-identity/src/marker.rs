//! Identity markers cached beside components
//!
//! A marker is a file named `<hex><suffix>` inside the component's root
//! holding the 32 raw identifier bytes. Markers are read optimistically: a
//! marker whose content is malformed or disagrees with its own file name is
//! stale and gets discarded. Two or more markers are never disambiguated.

use crate::error::IdentityError;
use crate::id::ComponentId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default marker file suffix
pub const DEFAULT_MARKER_SUFFIX: &str = ".oid";

/// Path of the marker for `id` under `root`
#[must_use]
pub fn marker_path(root: &Path, id: &ComponentId, suffix: &str) -> PathBuf {
    root.join(format!("{}{suffix}", id.to_hex()))
}

/// Read the cached identifier of a component
///
/// Returns `Ok(None)` on a cache miss, including a missing root or a stale
/// marker (which is removed so the next write leaves exactly one).
///
/// # Errors
/// [`IdentityError::Ambiguous`] when more than one marker exists, or
/// [`IdentityError::Io`] when the directory cannot be listed.
pub fn read_marker(name: &str, root: &Path, suffix: &str) -> Result<Option<ComponentId>, IdentityError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(IdentityError::io_error(root, e)),
    };

    let markers: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix))
        })
        .collect();

    match markers.as_slice() {
        [] => Ok(None),
        [single] => Ok(read_single(single, suffix)),
        many => Err(IdentityError::Ambiguous {
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

fn read_single(path: &Path, suffix: &str) -> Option<ComponentId> {
    let cached = fs::read(path)
        .ok()
        .and_then(|bytes| ComponentId::from_slice(&bytes).ok());

    let named = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(suffix))
        .and_then(|hex| hex.parse::<ComponentId>().ok());

    match (cached, named) {
        (Some(id), Some(expected)) if id == expected => Some(id),
        _ => {
            tracing::debug!(marker = %path.display(), "discarding stale identity marker");
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(marker = %path.display(), error = %e, "failed to remove stale marker");
            }
            None
        }
    }
}

/// Cache `id` beside the component
///
/// # Errors
/// Propagates the write failure; callers treat it as non-fatal.
pub fn write_marker(root: &Path, id: &ComponentId, suffix: &str) -> Result<PathBuf, IdentityError> {
    let path = marker_path(root, id, suffix);
    fs::write(&path, id.as_bytes()).map_err(|e| IdentityError::io_error(&path, e))?;
    Ok(path)
}
