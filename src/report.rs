// src/report.rs
// =============================================================================
// Formats scan results for humans (text) or machines (--json).
//
// Text report layout:
//   SUMMARY          total issues, then one count per status
//   DETAILED REPORT  one block per broken link
//   GITHUB ISSUES    one line per link: existing / created / failed
//
// The render_* functions return Strings so they can be tested; main.rs does
// the printing.
// =============================================================================

use crate::checker::{FailureRecord, LinkStatus};
use crate::github::TicketRef;
use anyhow::Result;
use serde::Serialize;

// Order statuses appear in the summary
const STATUS_ORDER: [LinkStatus; 3] = [LinkStatus::NotFound, LinkStatus::Redirect, LinkStatus::Error];

pub fn section_header(title: &str) -> String {
    let rule = "=".repeat(80);
    format!("\n{}\n{}\n{}", rule, title, rule)
}

pub fn render_summary(failures: &[FailureRecord]) -> String {
    let mut out = section_header("SUMMARY");

    if failures.is_empty() {
        out.push_str("\n\n✅ All links are working correctly!");
        return out;
    }

    out.push_str(&format!("\n\nTotal issues found: {}", failures.len()));
    for status in STATUS_ORDER {
        let count = failures.iter().filter(|f| f.status == status).count();
        if count > 0 {
            out.push_str(&format!("\n  {}: {}", status.as_str().to_uppercase(), count));
        }
    }
    out
}

pub fn render_details(failures: &[FailureRecord]) -> String {
    let mut out = section_header("DETAILED REPORT");

    for failure in failures {
        out.push_str(&format!(
            "\n\nNotebook: {}\n  Cell: {}\n  URL: {}\n  Status: {}",
            failure.notebook.display(),
            failure.cell,
            failure.url,
            failure.status.as_str().to_uppercase(),
        ));
        if failure.status_code != 0 {
            out.push_str(&format!("\n  HTTP Code: {}", failure.status_code));
        }
        if !failure.info.is_empty() {
            out.push_str(&format!("\n  Info: {}", failure.info));
        }
    }
    out
}

pub fn render_ticket_line(failure: &FailureRecord, ticket: Option<TicketRef>) -> String {
    match ticket {
        Some(TicketRef::Existing(number)) => {
            format!("  Issue already exists for {}: #{}", failure.url, number)
        }
        Some(TicketRef::Created(number)) => {
            format!("  Created issue #{} for {}", number, failure.url)
        }
        None => format!("  No issue recorded for {} (see log)", failure.url),
    }
}

// --json output
#[derive(Serialize)]
struct JsonReport<'a> {
    notebooks_checked: usize,
    total_issues: usize,
    issues: Vec<JsonIssue<'a>>,
}

#[derive(Serialize)]
struct JsonIssue<'a> {
    #[serde(flatten)]
    failure: &'a FailureRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    ticket: Option<TicketRef>,
}

pub fn render_json(
    notebooks_checked: usize,
    failures: &[FailureRecord],
    tickets: &[Option<TicketRef>],
) -> Result<String> {
    let issues = failures
        .iter()
        .enumerate()
        .map(|(i, failure)| JsonIssue {
            failure,
            ticket: tickets.get(i).copied().flatten(),
        })
        .collect();

    let report = JsonReport {
        notebooks_checked,
        total_issues: failures.len(),
        issues,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn failure(url: &str, status: LinkStatus, code: u16, info: &str) -> FailureRecord {
        FailureRecord {
            notebook: PathBuf::from("nb/lesson1.ipynb"),
            cell: 2,
            url: url.to_string(),
            status,
            status_code: code,
            info: info.to_string(),
        }
    }

    #[test]
    fn test_summary_counts_by_status() {
        let failures = vec![
            failure("https://a.example.com", LinkStatus::Error, 0, "connection failed"),
            failure("https://b.example.com", LinkStatus::NotFound, 404, ""),
            failure("https://c.example.com", LinkStatus::NotFound, 404, ""),
        ];
        let summary = render_summary(&failures);
        assert!(summary.contains("Total issues found: 3"));
        assert!(summary.contains("  NOT_FOUND: 2"));
        assert!(summary.contains("  ERROR: 1"));
        assert!(!summary.contains("REDIRECT"));
        assert!(summary.find("NOT_FOUND").unwrap() < summary.find("ERROR").unwrap());
    }

    #[test]
    fn test_summary_all_good() {
        assert!(render_summary(&[]).contains("All links are working correctly"));
    }

    #[test]
    fn test_details_skip_empty_fields() {
        let details = render_details(&[failure("https://a.example.com", LinkStatus::Error, 0, "")]);
        assert!(details.contains("Notebook: nb/lesson1.ipynb"));
        assert!(details.contains("  Cell: 2"));
        assert!(details.contains("  Status: ERROR"));
        assert!(!details.contains("HTTP Code"));
        assert!(!details.contains("Info:"));
    }

    #[test]
    fn test_details_include_code_and_info() {
        let details = render_details(&[
            failure("https://a.example.com", LinkStatus::Redirect, 301, "https://b.example.com"),
            failure("https://c.example.com", LinkStatus::NotFound, 404, ""),
        ]);
        assert!(details.contains(
            "\n\nNotebook: nb/lesson1.ipynb\n  Cell: 2\n  URL: https://a.example.com\n  Status: REDIRECT\n  HTTP Code: 301\n  Info: https://b.example.com"
        ));
        assert!(details.ends_with("  URL: https://c.example.com\n  Status: NOT_FOUND\n  HTTP Code: 404"));
    }

    #[test]
    fn test_ticket_lines() {
        let f = failure("https://a.example.com", LinkStatus::NotFound, 404, "");
        assert_eq!(
            render_ticket_line(&f, Some(TicketRef::Existing(12))),
            "  Issue already exists for https://a.example.com: #12"
        );
        assert_eq!(
            render_ticket_line(&f, Some(TicketRef::Created(13))),
            "  Created issue #13 for https://a.example.com"
        );
        assert!(render_ticket_line(&f, None).contains("No issue recorded"));
    }

    #[test]
    fn test_json_report() {
        let failures = vec![
            failure("https://a.example.com", LinkStatus::Redirect, 301, "https://b.example.com"),
            failure("https://c.example.com", LinkStatus::NotFound, 404, ""),
        ];
        let json = render_json(4, &failures, &[Some(TicketRef::Created(5)), None]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["notebooks_checked"], 4);
        assert_eq!(value["total_issues"], 2);
        assert_eq!(value["issues"][0]["status"], "redirect");
        assert_eq!(value["issues"][0]["status_code"], 301);
        assert_eq!(value["issues"][0]["ticket"]["kind"], "created");
        assert_eq!(value["issues"][0]["ticket"]["number"], 5);
        assert!(value["issues"][1].get("ticket").is_none());
    }
}
