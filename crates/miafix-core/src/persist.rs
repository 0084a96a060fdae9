//! Writing processed DATs next to their originals.
//!
//! Output goes through a temp file in the same directory, is synced, then
//! renamed into place. An interrupted run leaves either the complete output
//! or none; the original DAT is never opened for writing.

use crate::catalog::CatalogDocument;
use crate::config::CatalogConfig;
use crate::{MiaFixError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};

/// Path of the processed copy: `<stem><suffix>.dat` beside the original.
pub fn processed_path(original: &Path, suffix: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    original.with_file_name(format!(
        "{}{}.{}",
        stem,
        suffix,
        CatalogConfig::DAT_EXTENSION
    ))
}

/// Serialize `document` and write it as the processed copy of `original`.
///
/// Returns the path written.
pub fn write_processed_copy(
    document: &CatalogDocument,
    original: &Path,
    suffix: &str,
) -> Result<PathBuf> {
    let target = processed_path(original, suffix);
    let bytes = document.to_bytes().map_err(|e| e.with_path(original))?;
    atomic_write(&target, &bytes)?;
    Ok(target)
}

/// Write bytes to `path` via temp file, fsync and rename.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| MiaFixError::Config {
            message: format!("Not a file path: {}", path.display()),
        })?;
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, process::id()));

    let written = write_synced(&temp_path, bytes).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| MiaFixError::Io {
            message: format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })
    });

    if written.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
        }
    }
    written?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_err = |e| MiaFixError::io_with_path(e, path);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    Ok(())
}
