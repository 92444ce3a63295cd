// src/github/issue.rs
// =============================================================================
// What a broken-link issue looks like, and how we recognise our own issues.
//
// The issue body carries the link on a fixed line:
//
//     **URL:** `https://example.com/page`
//
// GitHub issues have no custom fields we could store the URL in, so this line
// is the only link between an issue and the URL it tracks. Writing it
// (render_body) and reading it back (extract_marked_url) both live here so
// the format can't drift between the two.
// =============================================================================

use super::api::NewIssue;
use crate::checker::FailureRecord;
use regex::Regex;
use std::sync::LazyLock;

/// Label used to find existing broken-link issues
pub const BROKEN_LINK_LABEL: &str = "broken-link";

/// Extra label marking issues opened by this tool
pub const AUTOMATED_LABEL: &str = "automated";

// URLs longer than this are shortened in the title
const TITLE_URL_MAX: usize = 60;
const TITLE_URL_KEEP: usize = 57;

static URL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*URL:\*\* `([^`]+)`").expect("url marker pattern is valid"));

// "Broken link: <url>", with long URLs cut to 57 chars + "..."
//
// Counts characters, not bytes, so non-ASCII URLs never split mid-character.
pub fn render_title(url: &str) -> String {
    let short = if url.chars().count() > TITLE_URL_MAX {
        let kept: String = url.chars().take(TITLE_URL_KEEP).collect();
        format!("{}...", kept)
    } else {
        url.to_string()
    };
    format!("Broken link: {}", short)
}

pub fn render_body(record: &FailureRecord) -> String {
    let mut body = format!(
        "## Broken Link Detected\n\n\
         **Status:** {}\n\
         **URL:** `{}`\n\
         **Notebook:** `{}`\n\
         **Cell:** {}\n\n",
        record.status.as_str().to_uppercase(),
        record.url,
        record.notebook_name(),
        record.cell,
    );

    if record.status_code != 0 {
        body.push_str(&format!("**HTTP Status Code:** {}\n\n", record.status_code));
    }

    if !record.info.is_empty() {
        body.push_str(&format!("**Additional Info:** {}\n\n", record.info));
    }

    body.push_str(
        "---\n\n\
         This issue was automatically created by the link checker workflow.\n\
         Please verify the link and update the notebook if necessary.\n",
    );

    body
}

pub fn new_issue(record: &FailureRecord) -> NewIssue {
    NewIssue {
        title: render_title(&record.url),
        body: render_body(record),
        labels: vec![BROKEN_LINK_LABEL.to_string(), AUTOMATED_LABEL.to_string()],
    }
}

/// The URL an issue body tracks, if it has the marker line
pub fn extract_marked_url(body: &str) -> Option<&str> {
    URL_MARKER
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
