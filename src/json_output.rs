//! JSON output for `--format json`
//!
//! One document per run: the per-notebook reports plus the summary,
//! serialized from the same structures the text renderer consumes.

use serde::Serialize;

use crate::runner::{BatchSummary, DocumentReport};

/// Machine-readable run report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub notebooks: &'a [DocumentReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a BatchSummary>,
}

/// Serialize the run report, pretty-printed for human diffing.
pub fn render(
    reports: &[DocumentReport],
    summary: Option<&BatchSummary>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        notebooks: reports,
        summary,
    })
}
