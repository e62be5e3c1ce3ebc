//! Notebook parsing and Solution code extraction
//!
//! Reads Jupyter notebook JSON and concatenates, in document order, every
//! code cell whose source contains a `class Solution` definition. Helper
//! cells that redefine or extend the class are legal and expected.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ProfileError;

/// Substring that marks a cell as defining the solution unit
pub const SOLUTION_MARKER: &str = "class Solution";

/// Identifier the loader looks up after executing the extracted code
pub const SOLUTION_CLASS_NAME: &str = "Solution";

#[derive(Debug, Deserialize)]
struct RawNotebook {
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    #[serde(default)]
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

/// Cell source as stored by nbformat: either one string or a list of
/// fragments joined without separators.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Lines(Vec::new())
    }
}

impl CellSource {
    fn joined(&self) -> String {
        match self {
            CellSource::Text(text) => text.clone(),
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

/// Extract the concatenated Solution code from a notebook file.
///
/// Returns [`ProfileError::Document`] for read/parse failures and
/// [`ProfileError::SolutionNotFound`] when no code cell matches the marker.
pub fn extract_solution_source(path: &Path) -> Result<String, ProfileError> {
    let raw = fs::read_to_string(path).map_err(|e| ProfileError::Document {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let notebook: RawNotebook =
        serde_json::from_str(&raw).map_err(|e| ProfileError::Document {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let fragments: Vec<String> = notebook
        .cells
        .iter()
        .filter(|cell| cell.cell_type == "code")
        .map(|cell| cell.source.joined())
        .filter(|text| text.contains(SOLUTION_MARKER))
        .collect();

    if fragments.is_empty() {
        Err(ProfileError::SolutionNotFound)
    } else {
        Ok(fragments.join("\n"))
    }
}
