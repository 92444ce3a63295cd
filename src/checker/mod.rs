// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - markdown: Extracts candidate links from markdown cell text
// - http: Probes a single URL and classifies the answer
//
// This file ties them together: for every markdown cell of a notebook it
// extracts links, skips the ones that point at local content, probes the rest
// one by one and keeps a FailureRecord for everything that isn't "ok".
// =============================================================================

mod http;
mod markdown;

pub use http::{
    is_probeable, LinkStatus, ProbeConfig, ProbeOutcome, Prober, DEFAULT_MAX_REDIRECTS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
pub use markdown::extract_markdown_links;

use crate::notebook::Notebook;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

// A link that failed its probe, together with where it was found
//
// This is the unit handed to the issue reconciler and to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Notebook the link was found in
    pub notebook: PathBuf,
    /// Index of the cell within the notebook
    pub cell: usize,
    pub url: String,
    pub status: LinkStatus,
    /// HTTP status code, 0 when no response was received
    pub status_code: u16,
    /// Final URL, redirect target or error reason
    pub info: String,
}

impl FailureRecord {
    pub fn new(notebook: &Path, cell: usize, url: &str, outcome: ProbeOutcome) -> Self {
        FailureRecord {
            notebook: notebook.to_path_buf(),
            cell,
            url: url.to_string(),
            status: outcome.status,
            status_code: outcome.code,
            info: outcome.target,
        }
    }

    /// File name of the notebook without its directories
    pub fn notebook_name(&self) -> String {
        self.notebook
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.notebook.display().to_string())
    }
}

// Checks every markdown cell of a notebook
//
// Cells are processed in order and links are probed sequentially. Links are
// deduplicated per cell only, so a URL used in two cells is probed twice and
// reported once per cell.
pub async fn check_notebook(prober: &Prober, notebook: &Notebook) -> Vec<FailureRecord> {
    let mut failures = Vec::new();

    for (index, text) in notebook.markdown_cells() {
        for link in extract_markdown_links(&text) {
            if !is_probeable(&link) {
                debug!(url = %link, cell = index, "skipping local link");
                continue;
            }

            let outcome = prober.probe(&link).await;
            debug!(url = %link, status = %outcome.status, code = outcome.code, "probed");

            if !outcome.is_ok() {
                failures.push(FailureRecord::new(&notebook.path, index, &link, outcome));
            }
        }
    }

    failures
}
