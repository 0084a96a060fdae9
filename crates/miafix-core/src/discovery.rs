//! Finding the DAT files a run should process.

use crate::config::CatalogConfig;
use crate::identity::resolve_system_name;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A DAT file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSource {
    pub path: PathBuf,
    pub filename: String,
    /// Canonical system name derived from `filename`.
    pub system_name: String,
}

impl CatalogSource {
    /// Describe a DAT at `path`, resolving its system name from the filename.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let system_name = resolve_system_name(&filename);
        Self {
            path,
            filename,
            system_name,
        }
    }
}

fn is_dat(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == CatalogConfig::DAT_EXTENSION)
}

/// Collect `.dat` files from files and directories (walked recursively).
///
/// Sorted by case-folded path; duplicates are dropped.
pub fn discover_catalogs<P: AsRef<Path>>(inputs: &[P]) -> Vec<CatalogSource> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_dat(entry.path()) => {
                        found.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable path under {}: {}", input.display(), e),
                }
            }
        } else if input.is_file() {
            if is_dat(input) {
                found.push(input.to_path_buf());
            }
        } else {
            warn!("Input path does not exist: {}", input.display());
        }
    }

    found.retain(|path| seen.insert(path.clone()));
    found.sort_by_cached_key(|path| path.to_string_lossy().to_lowercase());

    let sources: Vec<CatalogSource> = found.into_iter().map(CatalogSource::from_path).collect();
    for source in &sources {
        debug!(system = %source.system_name, "{}", source.path.display());
    }
    sources
}
