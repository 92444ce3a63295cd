// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Find notebooks and check the links in their markdown cells
// 3. Print a report (text or JSON)
// 4. Open GitHub issues for broken links that aren't tracked yet
//
// Everything runs one step at a time: one notebook, one cell, one link, one
// issue. A broken notebook, link or API call is logged and skipped; the run
// always finishes and exits normally.
// =============================================================================

mod checker; // src/checker/ - link extraction and probing
mod cli; // src/cli.rs - command-line parsing
mod github; // src/github/ - GitHub issue tracking
mod logging; // src/logging.rs - tracing setup
mod notebook; // src/notebook/ - reading and finding .ipynb files
mod report; // src/report.rs - text and JSON output

use anyhow::Result;
use checker::{FailureRecord, Prober};
use clap::Parser;
use cli::Cli;
use github::Reconciler;
use notebook::Notebook;
use tracing::{error, info, warn};

// A single-threaded runtime is all we need: requests are awaited in sequence
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = notebook::find_notebooks(&cli.paths);
    if paths.is_empty() {
        println!("No .ipynb files found.");
        return Ok(());
    }

    let prober = Prober::new(&cli.probe_config())?;

    if !cli.json {
        println!("Checking {} notebook(s)...\n", paths.len());
    }

    let mut failures: Vec<FailureRecord> = Vec::new();
    let mut checked = 0;

    for path in &paths {
        let notebook = match Notebook::load(path) {
            Ok(notebook) => notebook,
            Err(e) => {
                warn!("skipping notebook: {:#}", e);
                continue;
            }
        };
        checked += 1;

        let found = checker::check_notebook(&prober, &notebook).await;
        if !cli.json {
            println!("Checking {}... found {} issue(s)", display_name(path), found.len());
        }
        failures.extend(found);
    }

    let mut reconciler = Reconciler::from_config(&cli.tracker_config());

    if cli.json {
        let tickets = reconciler.reconcile_all(&failures).await;
        println!("{}", report::render_json(checked, &failures, &tickets)?);
        return Ok(());
    }

    println!("{}", report::render_summary(&failures));
    if failures.is_empty() {
        return Ok(());
    }
    println!("{}", report::render_details(&failures));

    file_issues(&mut reconciler, &failures).await;
    Ok(())
}

// Prints the GITHUB ISSUES section while reconciling each failure
async fn file_issues<T: github::Tracker>(reconciler: &mut Reconciler<T>, failures: &[FailureRecord]) {
    println!("{}", report::section_header("GITHUB ISSUES"));

    if !reconciler.is_enabled() {
        println!("\nGitHub issue creation skipped (not configured or running locally)");
        return;
    }

    println!("\nFetching existing issues...");
    let existing = reconciler.existing_count().await;
    println!("Found {} existing issue(s) for broken links", existing);

    println!("\nCreating GitHub issues for broken links...");
    let mut created = 0;
    for failure in failures {
        let ticket = reconciler.reconcile(failure).await;
        if matches!(ticket, Some(github::TicketRef::Created(_))) {
            created += 1;
        }
        println!("{}", report::render_ticket_line(failure, ticket));
    }
    info!(created, "finished filing issues");
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
