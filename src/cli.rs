// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command: scan the given notebooks (or directories of
// notebooks) and report broken links. GitHub settings can be passed as flags
// but normally come from the environment, which is what GitHub Actions
// provides (GITHUB_TOKEN, GITHUB_REPOSITORY).
// =============================================================================

use crate::checker::{ProbeConfig, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::github::{TrackerConfig, GITHUB_API_BASE};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "nb-link-guardian",
    version,
    about = "Find broken links in Jupyter notebooks and track them as GitHub issues",
    long_about = "nb-link-guardian scans the markdown cells of Jupyter notebooks, checks every \
                  http(s) link with a HEAD request and reports links that are missing, redirected \
                  or failing. When a GitHub token and repository are available it opens one issue \
                  per broken URL, skipping URLs that already have an open issue."
)]
pub struct Cli {
    /// Notebook files or directories to scan (directories are searched recursively)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output results in JSON format instead of a text report
    #[arg(long)]
    pub json: bool,

    /// Timeout in seconds for each link check
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum number of redirects to follow (0 reports the first redirect as-is)
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// User-Agent header sent with link checks
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// GitHub token used to list and create issues
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository to file issues in (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_BASE)]
    pub api_base: String,

    /// Don't create issues even if GitHub credentials are available
    #[arg(long)]
    pub no_issues: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: Duration::from_secs(self.timeout),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        if self.no_issues {
            return TrackerConfig::Disabled;
        }
        TrackerConfig::from_parts(
            self.github_token.clone(),
            self.repository.clone(),
            &self.api_base,
        )
    }
}
