//! Medir - performance profiler for notebook-embedded Solution classes
//!
//! This library extracts Python `Solution` classes from Jupyter notebooks,
//! executes them in an embedded interpreter, and measures a single
//! invocation of the selected entry point: wall-clock time, resident-memory
//! delta, and optional per-call or per-line statistics.

pub mod capability;
pub mod cli;
pub mod convert;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod inputs;
pub mod json_output;
pub mod loader;
pub mod memory;
pub mod notebook;
pub mod profiler;
pub mod report;
pub mod resolver;
pub mod runner;
