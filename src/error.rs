//! Per-notebook error taxonomy
//!
//! Every variant maps to a skip-and-continue decision in the batch runner;
//! nothing here ever aborts a whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing a single notebook
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Notebook could not be read or is not valid notebook JSON
    #[error("failed to read notebook {}: {message}", path.display())]
    Document { path: PathBuf, message: String },

    /// No code cell containing a `class Solution` definition
    #[error("no Solution class found")]
    SolutionNotFound,

    /// Extracted code failed to compile or raised at module level
    #[error("solution code failed to execute: {0}")]
    Load(String),

    /// The loaded class exposes no profileable method
    #[error("no public method to profile")]
    NoEntryPoint,

    /// No test input could be resolved for this notebook
    #[error("no test input available")]
    NoInput,

    /// Supplied test input is not valid JSON
    #[error("invalid test input: {0}")]
    InvalidInput(String),
}
