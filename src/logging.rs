// src/logging.rs
// =============================================================================
// Diagnostics go through `tracing` to stderr; the report itself is printed to
// stdout with println!, so `nb-link-guardian > report.txt` captures only the
// report.
//
// Verbosity: RUST_LOG wins if set, otherwise -v flags pick the level:
//   (none) warn   -v info   -vv debug   -vvv trace
// =============================================================================

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nb_link_guardian={}", level_for(verbose))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
