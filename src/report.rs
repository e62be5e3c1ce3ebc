//! Console/log tee
//!
//! Every line the run prints is also appended, timestamped, to a plain-text
//! log file so batch history survives the terminal. The log mirrors exactly
//! what the console shows; nothing is re-derived.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Duplicates console lines into an append-only log file.
pub struct Reporter {
    log: Option<File>,
}

impl Reporter {
    /// Open the log file for appending. A log that cannot be opened is a
    /// warning; the run continues console-only.
    pub fn new(log_path: Option<&Path>) -> Self {
        let log = log_path.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!("cannot open log file {}: {e}", path.display());
                    None
                }
            }
        });
        Self { log }
    }

    /// Print one line to stdout and mirror it to the log.
    pub fn line(&mut self, text: &str) {
        println!("{text}");
        if let Some(log) = &mut self.log {
            let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(log, "[{stamp}] {text}");
        }
    }

    /// Print several lines.
    pub fn lines(&mut self, texts: &[String]) {
        for text in texts {
            self.line(text);
        }
    }
}
