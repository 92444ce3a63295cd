// src/checker/http.rs
// =============================================================================
// This module probes URLs with a single HTTP HEAD request and classifies the
// answer into one of four statuses: ok, not_found, redirect, error.
//
// Key functionality:
// - One HEAD request per URL, bounded by a timeout (default 10 seconds)
// - Redirects are followed up to a limit; a changed final URL is a "redirect"
// - Any failure (DNS, refused connection, TLS, timeout) becomes an "error"
//   outcome with code 0 - probing never returns an Err
// - No retries: a transient failure is reported as-is
//
// Rust concepts:
// - async/await: For network I/O (we still await one request at a time)
// - Enums: To represent the different link states
// - Error source chains: To build a readable reason from nested errors
// =============================================================================

use anyhow::{Context, Result};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, StatusCode};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of redirects reqwest follows before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// User-Agent sent with every probe so site owners can identify us
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; nb-link-guardian/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

// Represents the status of a link after probing
//
// Serialized as "ok", "not_found", "redirect" or "error"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Link answered without error and without moving
    Ok,
    /// Server answered 404
    NotFound,
    /// Link moved (3xx, or the final URL differs from the requested one)
    Redirect,
    /// Any other HTTP error code or a network-level failure
    Error,
}

impl LinkStatus {
    /// Lower-case wire name, the same string serde produces
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Ok => "ok",
            LinkStatus::NotFound => "not_found",
            LinkStatus::Redirect => "redirect",
            LinkStatus::Error => "error",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The classified result of probing one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub status: LinkStatus,
    /// HTTP status code, 0 when no response was received
    pub code: u16,
    /// Final URL, redirect target, or a human-readable error reason
    pub target: String,
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == LinkStatus::Ok
    }

    // Network-level failure: no status code available
    fn failed(reason: impl Into<String>) -> Self {
        ProbeOutcome {
            status: LinkStatus::Error,
            code: 0,
            target: reason.into(),
        }
    }
}

// Settings for the probe HTTP client
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    /// 0 disables automatic redirect following
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// Probes links one at a time with a shared HTTP client
//
// Reusing one Client keeps connection pooling across probes of the same host.
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let policy = if config.max_redirects == 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(config.max_redirects)
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(policy)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client for link probing")?;

        Ok(Prober { client })
    }

    // Probes a single URL
    //
    // Always returns exactly one outcome; every failure path is folded into
    // an Error outcome instead of propagating.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let requested = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return ProbeOutcome::failed(format!("invalid URL: {}", e)),
        };

        match self.client.head(requested.clone()).send().await {
            Ok(response) => {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok());
                classify_response(&requested, response.url(), response.status(), location)
            }
            Err(e) => categorize_error(&e),
        }
    }
}

// Decides whether a link is worth requesting at all
//
// Links without a scheme (relative paths, #anchors) and file: links point at
// local content and are skipped rather than reported. Only the scheme is
// looked at: a malformed http(s) link still gets requested and comes back as
// an "invalid URL" error.
pub fn is_probeable(link: &str) -> bool {
    match link_scheme(link) {
        Some(scheme) => !scheme.eq_ignore_ascii_case("file"),
        None => false,
    }
}

// The text before the first ':' if it is a valid URI scheme
// (a letter followed by letters, digits, '+', '-' or '.')
fn link_scheme(link: &str) -> Option<&str> {
    let (scheme, _) = link.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

// Maps a received HTTP response to an outcome
//
// Order matters:
// - error codes win, even after a redirect chain (a moved page that ends in
//   404 is still not_found)
// - a 301/302/303/307/308 that reached us was not followed; report where it
//   points
// - any other 3xx (300, 304, ...) is not a redirect we can act on and counts
//   as an error with its code
// - otherwise a changed final URL means we were redirected
//
// `requested` is the parsed form of the input, so "http://x.com" and the
// normalized "http://x.com/" compare equal.
pub fn classify_response(
    requested: &Url,
    final_url: &Url,
    status: StatusCode,
    location: Option<&str>,
) -> ProbeOutcome {
    let code = status.as_u16();

    let (status, target) = match status {
        StatusCode::NOT_FOUND => (LinkStatus::NotFound, final_url.to_string()),
        s if s.as_u16() >= 400 => (LinkStatus::Error, final_url.to_string()),
        StatusCode::MOVED_PERMANENTLY
        | StatusCode::FOUND
        | StatusCode::SEE_OTHER
        | StatusCode::TEMPORARY_REDIRECT
        | StatusCode::PERMANENT_REDIRECT => {
            let target = location
                .map(str::to_string)
                .unwrap_or_else(|| final_url.to_string());
            (LinkStatus::Redirect, target)
        }
        s if s.is_redirection() => (LinkStatus::Error, final_url.to_string()),
        _ if final_url != requested => (LinkStatus::Redirect, final_url.to_string()),
        _ => (LinkStatus::Ok, final_url.to_string()),
    };

    ProbeOutcome {
        status,
        code,
        target,
    }
}

// Turns a reqwest error into an Error outcome with a readable reason
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure / connection refused
// - TLS certificate problems
// - Too many redirects
fn categorize_error(error: &reqwest::Error) -> ProbeOutcome {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error_chain(error))
    } else {
        error_chain(error)
    };

    ProbeOutcome::failed(reason)
}

// Joins an error and all of its sources into one line
//
// reqwest's own Display is often just "error sending request"; the useful
// part (e.g. "dns error: failed to lookup address") sits further down.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD instead of GET?
//    - HEAD asks for the headers only, so no page body is downloaded
//    - It's enough to learn the status code and where redirects lead
//
// 2. Why does probe() return ProbeOutcome and not Result?
//    - A broken link is a normal finding, not a program error
//    - Folding failures into the outcome means one bad host can never stop
//      the rest of the scan
//
// 3. What is `impl Into<String>`?
//    - Accepts anything convertible to String (&str, String, ...)
//    - Callers don't need to write .to_string() themselves
// -----------------------------------------------------------------------------
