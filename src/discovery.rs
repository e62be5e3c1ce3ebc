//! Notebook discovery
//!
//! Enumerates `*.ipynb` files directly inside a directory. Results are
//! sorted by file name so batch order (and therefore log output) is stable
//! across runs.

use std::path::{Path, PathBuf};

/// Find all notebooks in `dir`, sorted by file name.
///
/// An unreadable directory yields an empty list with a warning; discovery
/// problems never fail the run.
pub fn find_notebooks(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("cannot read directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut notebooks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "ipynb")
        })
        .collect();
    notebooks.sort();
    notebooks
}
