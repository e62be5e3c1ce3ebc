use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use medir::cli::{Cli, OutputFormat};
use medir::runner::{ProfileModeFlags, RunOptions};
use medir::{capability, discovery, json_output, report::Reporter, runner};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let notebooks: Vec<PathBuf> = match &args.notebook {
        Some(path) => vec![path.clone()],
        None => discovery::find_notebooks(&args.dir),
    };

    let log_path = (!args.no_log).then(|| args.log_file.clone());
    let mut reporter = Reporter::new(log_path.as_deref());

    if notebooks.is_empty() {
        reporter.line("No notebooks found.");
        return Ok(());
    }

    let opts = RunOptions {
        show_memory: args.memory,
        mode: ProfileModeFlags {
            per_call: args.profile_functions,
            per_line: args.profile_lines,
        },
        // Probe tracing support once; every document shares the answer
        caps: capability::probe(),
        inline_input: args.input.clone(),
        input_file: args.input_file.clone(),
    };

    match args.format {
        OutputFormat::Text => {
            reporter.line(&"=".repeat(70));
            reporter.line("Notebook Solution Performance Profiler");
            reporter.line(&"=".repeat(70));
            reporter.line("");

            let reports = runner::run_batch(&notebooks, &opts, |doc| {
                reporter.lines(&runner::render_document(doc, args.memory));
            });

            if let Some(summary) = runner::summarize(&reports, args.memory) {
                reporter.lines(&runner::render_summary(&summary));
            }
        }
        OutputFormat::Json => {
            let reports = runner::run_batch(&notebooks, &opts, |_| {});
            let summary = runner::summarize(&reports, args.memory);
            reporter.line(&json_output::render(&reports, summary.as_ref())?);
        }
    }

    // Absence of successful work is reported above, never an error exit
    Ok(())
}
