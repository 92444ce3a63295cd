// src/github/api.rs
// =============================================================================
// This module talks to the GitHub REST API (v3) for issues.
//
// Only two endpoints are needed:
// - GET  /repos/{owner}/{repo}/issues?state=open&labels=...&per_page=&page=
// - POST /repos/{owner}/{repo}/issues   {"title", "body", "labels"}
//
// They sit behind the `Tracker` trait so the reconciler can be tested against
// a stub that records every call instead of a live GitHub.
//
// Authentication is a bearer token in the Authorization header. The token and
// repository usually come from GITHUB_TOKEN / GITHUB_REPOSITORY, which GitHub
// Actions sets for every workflow run.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("nb-link-guardian/", env!("CARGO_PKG_VERSION"));

/// Errors from the issue tracker boundary
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),

    #[error("Token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

// An issue as returned by the list endpoint (only the fields we read)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    // GitHub sends null for issues created without a body
    #[serde(default)]
    pub body: Option<String>,
}

// Payload for creating an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Remote issue tracker operations used by the reconciler
#[async_trait]
pub trait Tracker: Send + Sync {
    /// One page (1-based) of open issues carrying `label`
    async fn list_open_issues(
        &self,
        label: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RemoteIssue>, TrackerError>;

    /// Creates an issue and returns it as stored by the tracker
    async fn create_issue(&self, issue: &NewIssue) -> Result<RemoteIssue, TrackerError>;
}

// Where issues go, or that they don't go anywhere
//
// Built from CLI flags / environment once at startup and handed to the
// reconciler, which becomes a no-op for the Disabled variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerConfig {
    Disabled,
    GitHub {
        token: String,
        repository: String,
        api_base: String,
    },
}

impl TrackerConfig {
    // Both a token and a repository are needed; blank values count as missing
    pub fn from_parts(token: Option<String>, repository: Option<String>, api_base: &str) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        let repository = repository.filter(|r| !r.trim().is_empty());

        match (token, repository) {
            (Some(token), Some(repository)) => TrackerConfig::GitHub {
                token,
                repository,
                api_base: api_base.trim_end_matches('/').to_string(),
            },
            _ => TrackerConfig::Disabled,
        }
    }
}

// GitHub implementation of Tracker
pub struct GitHubTracker {
    client: Client,
    issues_url: String,
}

impl GitHubTracker {
    pub fn new(token: &str, repository: &str, api_base: &str) -> Result<Self, TrackerError> {
        let (owner, repo) = parse_repository(repository)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| TrackerError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(GitHubTracker {
            client,
            issues_url: format!(
                "{}/repos/{}/{}/issues",
                api_base.trim_end_matches('/'),
                owner,
                repo
            ),
        })
    }
}

#[async_trait]
impl Tracker for GitHubTracker {
    async fn list_open_issues(
        &self,
        label: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RemoteIssue>, TrackerError> {
        let response = self
            .client
            .get(&self.issues_url)
            .query(&[
                ("state", "open".to_string()),
                ("labels", label.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<RemoteIssue, TrackerError> {
        let response = self
            .client
            .post(&self.issues_url)
            .json(issue)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

// Turns non-2xx answers into TrackerError::Status with GitHub's message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(TrackerError::Status {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

// Parses a repository identifier into (owner, repo)
//
// Supported formats:
//   - owner/repo                      (what GITHUB_REPOSITORY contains)
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - github.com/owner/repo
fn parse_repository(repository: &str) -> Result<(String, String), TrackerError> {
    let invalid = || TrackerError::InvalidRepository(repository.to_string());

    let path = repository
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_start_matches("github.com/")
        .trim_end_matches('/');

    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() != 2 {
        return Err(invalid());
    }

    let owner = parts[0];
    let repo = parts[1].trim_end_matches(".git");
    if owner.is_empty() || repo.is_empty() {
        return Err(invalid());
    }

    Ok((owner.to_string(), repo.to_string()))
}
