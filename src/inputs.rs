//! Test input resolution
//!
//! Precedence per notebook: input file > inline JSON > built-in table keyed
//! by notebook stem > no input (skip). The built-in table covers the
//! problems this tool is most often pointed at.

use std::path::Path;

use serde_json::{json, Value};

use crate::error::ProfileError;

/// Built-in test input for a known notebook stem, if any.
pub fn builtin_input_for(stem: &str) -> Option<Value> {
    match stem {
        // 2 units of trapped water
        "42. Trapping Rain Water" => Some(json!([2, 0, 2])),
        "1. Two Sum" => Some(json!({"nums": [2, 7, 11, 15], "target": 9})),
        _ => None,
    }
}

/// Resolve the test input for `notebook`.
///
/// `Ok(None)` means no input is available and the notebook is skipped.
/// Unreadable files and malformed JSON are per-notebook configuration
/// errors, never a batch abort.
pub fn resolve_input(
    inline: Option<&str>,
    input_file: Option<&Path>,
    notebook: &Path,
) -> Result<Option<Value>, ProfileError> {
    if let Some(path) = input_file {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ProfileError::InvalidInput(format!("{}: {e}", path.display())))?;
        let value = serde_json::from_str(&raw)
            .map_err(|e| ProfileError::InvalidInput(format!("{}: {e}", path.display())))?;
        return Ok(Some(value));
    }

    if let Some(text) = inline {
        let value =
            serde_json::from_str(text).map_err(|e| ProfileError::InvalidInput(e.to_string()))?;
        return Ok(Some(value));
    }

    let stem = notebook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(builtin_input_for(&stem))
}
