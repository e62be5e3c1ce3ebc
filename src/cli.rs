//! CLI argument parsing for Medir

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for profiling runs
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "medir")]
#[command(version)]
#[command(about = "Profile Solution classes embedded in Jupyter notebooks", long_about = None)]
pub struct Cli {
    /// Specific notebook to profile (otherwise scan --dir)
    #[arg(short = 'n', long = "notebook", value_name = "PATH")]
    pub notebook: Option<PathBuf>,

    /// Directory to search for notebooks
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Show detailed memory statistics
    #[arg(short = 'm', long = "memory")]
    pub memory: bool,

    /// Inline JSON test input for the entry point
    #[arg(short = 'i', long = "input", value_name = "JSON")]
    pub input: Option<String>,

    /// File containing JSON test input (takes precedence over --input)
    #[arg(long = "input-file", value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Collect per-function call statistics around the invocation
    #[arg(long = "profile-functions")]
    pub profile_functions: bool,

    /// Collect per-line timing for the entry-point method
    #[arg(long = "profile-lines", conflicts_with = "profile_functions")]
    pub profile_lines: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Append-only run log mirroring console output
    #[arg(long = "log-file", value_name = "PATH", default_value = "profiler.log")]
    pub log_file: PathBuf,

    /// Disable the run log entirely
    #[arg(long = "no-log")]
    pub no_log: bool,

    /// Enable debug tracing to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
