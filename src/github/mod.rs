// src/github/mod.rs
// =============================================================================
// This module files broken links as GitHub issues.
//
// Submodules:
// - api: The Tracker trait and its GitHub REST implementation
// - issue: Issue title/body template and the URL marker inside the body
// - reconcile: Avoids duplicate issues for URLs that are already tracked
//
// Issue creation is optional: without a token and a repository the
// reconciler is disabled and the scan still runs and reports normally.
// =============================================================================

mod api;
mod issue;
mod reconcile;

pub use api::{Tracker, TrackerConfig, GITHUB_API_BASE};
pub use reconcile::{Reconciler, TicketRef};
