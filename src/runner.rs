//! Per-notebook pipeline and batch orchestration
//!
//! Documents are processed strictly sequentially: parse, load, resolve,
//! profile, one at a time, so that no concurrent work perturbs the timing
//! and memory measurements. Each notebook gets a fresh interpreter that is
//! discarded afterwards. Every per-document failure becomes a skip or a
//! failed result; nothing stops the batch.

use std::path::{Path, PathBuf};

use rustpython_vm::{AsObject, Interpreter};
use serde::Serialize;

use crate::capability::TraceCapability;
use crate::convert::format_exception;
use crate::dispatch::CallArgs;
use crate::error::ProfileError;
use crate::inputs;
use crate::loader;
use crate::notebook;
use crate::profiler::{self, ProfileMode, ProfileResult};
use crate::resolver;

/// Batch-wide options resolved from the CLI
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub show_memory: bool,
    pub mode: ProfileModeFlags,
    pub caps: TraceCapability,
    pub inline_input: Option<String>,
    pub input_file: Option<PathBuf>,
}

/// Raw profiling flags as the CLI hands them over
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileModeFlags {
    pub per_call: bool,
    pub per_line: bool,
}

impl RunOptions {
    fn profile_mode(&self) -> ProfileMode {
        ProfileMode::from_flags(self.mode.per_call, self.mode.per_line)
    }
}

/// What happened to one notebook
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Document skipped before any invocation happened
    Skipped { skipped: String },
    /// The entry point was invoked (successfully or not)
    Profiled(ProfileResult),
}

/// Per-notebook report consumed by the text renderer, the JSON renderer and
/// the log mirror alike
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub notebook: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Mean statistics over the successful results of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub profiled: usize,
    pub avg_execution_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_memory_used_mb: Option<f64>,
}

/// Run the full pipeline for one notebook with an already-classified input.
pub fn profile_document(
    path: &Path,
    input: &CallArgs,
    opts: &RunOptions,
) -> Result<ProfileResult, ProfileError> {
    let fragment = notebook::extract_solution_source(path)?;

    // One interpreter per document; discarded on return so nothing leaks
    // into the next iteration.
    let interpreter = Interpreter::without_stdlib(Default::default());
    interpreter.enter(|vm| {
        let class = loader::load_solution(vm, &fragment)?;
        let method_name =
            resolver::resolve_entry_point(&class).ok_or(ProfileError::NoEntryPoint)?;

        let bound = class
            .as_object()
            .call((), vm)
            .and_then(|instance| instance.get_attr(&*vm.ctx.new_str(method_name.as_str()), vm));
        match bound {
            Ok(method) => Ok(profiler::profile_entry(
                vm,
                &method,
                &method_name,
                input,
                opts.profile_mode(),
                opts.caps,
            )),
            // A constructor that raises is an invocation failure, recorded
            // against the method we were about to profile
            Err(exc) => Ok(ProfileResult::failure(
                &method_name,
                format_exception(vm, &exc),
            )),
        }
    })
}

/// Resolve the input for one notebook and run the pipeline, folding every
/// error class into a report.
pub fn process_document(path: &Path, opts: &RunOptions) -> DocumentReport {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let outcome = match inputs::resolve_input(
        opts.inline_input.as_deref(),
        opts.input_file.as_deref(),
        path,
    ) {
        Err(e) => Outcome::Skipped {
            skipped: e.to_string(),
        },
        Ok(None) => Outcome::Skipped {
            skipped: ProfileError::NoInput.to_string(),
        },
        Ok(Some(input)) => {
            let args = CallArgs::classify(input);
            match profile_document(path, &args, opts) {
                Ok(result) => Outcome::Profiled(result),
                Err(e) => Outcome::Skipped {
                    skipped: e.to_string(),
                },
            }
        }
    };

    DocumentReport {
        notebook: name,
        outcome,
    }
}

/// Process every notebook in order, invoking `on_report` after each one so
/// the caller can stream output. A single document can never prevent the
/// processing of subsequent documents.
pub fn run_batch(
    paths: &[PathBuf],
    opts: &RunOptions,
    mut on_report: impl FnMut(&DocumentReport),
) -> Vec<DocumentReport> {
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let report = process_document(path, opts);
        on_report(&report);
        reports.push(report);
    }
    reports
}

/// Arithmetic means over successful results only; `None` when nothing
/// succeeded.
pub fn summarize(reports: &[DocumentReport], with_memory: bool) -> Option<BatchSummary> {
    let successes: Vec<&ProfileResult> = reports
        .iter()
        .filter_map(|report| match &report.outcome {
            Outcome::Profiled(result) if result.success => Some(result),
            _ => None,
        })
        .collect();
    if successes.is_empty() {
        return None;
    }

    let count = successes.len();
    let avg_execution_time_ms = successes
        .iter()
        .filter_map(|r| r.execution_time_ms)
        .sum::<f64>()
        / count as f64;
    let avg_memory_used_mb = with_memory.then(|| {
        successes.iter().filter_map(|r| r.memory_used_mb).sum::<f64>() / count as f64
    });

    Some(BatchSummary {
        profiled: count,
        avg_execution_time_ms,
        avg_memory_used_mb,
    })
}

/// Console lines for one processed notebook.
pub fn render_document(report: &DocumentReport, show_memory: bool) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Processing: {}", report.notebook));
    lines.push("-".repeat(70));

    match &report.outcome {
        Outcome::Skipped { skipped } => {
            lines.push(format!("  Skipped: {skipped}"));
        }
        Outcome::Profiled(result) if result.success => {
            lines.push(format!("  Method: {}", result.method));
            if let Some(ms) = result.execution_time_ms {
                lines.push(format!("  Execution Time: {ms:.4} ms"));
            }
            if let Some(value) = &result.result {
                lines.push(format!("  Result: {value}"));
            }
            if show_memory {
                if let (Some(before), Some(after), Some(used)) = (
                    result.memory_before_mb,
                    result.memory_after_mb,
                    result.memory_used_mb,
                ) {
                    lines.push(format!("  Memory Before: {before:.2} MB"));
                    lines.push(format!("  Memory After: {after:.2} MB"));
                    lines.push(format!("  Memory Used: {used:.2} MB"));
                }
            }
            if let Some(stats) = &result.call_stats {
                lines.push("  Per-call statistics:".to_string());
                lines.extend(profiler::render_call_stats(stats));
            }
            if let Some(stats) = &result.line_stats {
                lines.push("  Per-line statistics:".to_string());
                lines.extend(profiler::render_line_stats(stats));
            }
        }
        Outcome::Profiled(result) => {
            lines.push(format!(
                "  Error: {} (method {})",
                result.error.as_deref().unwrap_or("unknown error"),
                result.method
            ));
        }
    }
    lines.push(String::new());
    lines
}

/// Console lines for the batch summary.
pub fn render_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("=".repeat(70));
    lines.push(format!("Summary ({} solutions profiled)", summary.profiled));
    lines.push("=".repeat(70));
    lines.push(format!(
        "Average Execution Time: {:.4} ms",
        summary.avg_execution_time_ms
    ));
    if let Some(mb) = summary.avg_memory_used_mb {
        lines.push(format!("Average Memory Used: {mb:.2} MB"));
    }
    lines
}
