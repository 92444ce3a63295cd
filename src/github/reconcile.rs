// src/github/reconcile.rs
// =============================================================================
// Matches broken links against open GitHub issues so each URL gets at most
// one issue, across runs and within a run.
//
// How it works:
// 1. On first use, page through all open issues labelled "broken-link" and
//    build a map URL -> issue number from the marker line in each body
// 2. For each failure: if the URL is in the map, report that issue;
//    otherwise open a new issue and add it to the map
//
// Errors never stop the run. A failed page fetch keeps what was collected so
// far; a failed create yields None for that failure only.
//
// Rust concepts:
// - Enums with data: Disabled vs Enabled is a type, not a None-check
// - Generics: Reconciler<T: Tracker> works with GitHub or a test stub
// - HashMap: The URL -> issue number lookup
// =============================================================================

use super::api::{GitHubTracker, Tracker, TrackerConfig};
use super::issue::{extract_marked_url, new_issue, BROKEN_LINK_LABEL};
use crate::checker::FailureRecord;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Page size for listing issues (GitHub's maximum)
pub const PER_PAGE: u32 = 100;

// The issue a failure ended up attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum TicketRef {
    /// An open issue already tracked this URL
    Existing(u64),
    /// We opened a new issue during this run
    Created(u64),
}

pub enum Reconciler<T> {
    /// No credentials: nothing is fetched or created
    Disabled,
    Enabled(ActiveReconciler<T>),
}

pub struct ActiveReconciler<T> {
    tracker: T,
    // None until the first lookup
    known: Option<HashMap<String, u64>>,
}

impl Reconciler<GitHubTracker> {
    // Builds the production reconciler from configuration
    //
    // A config that can't produce a client (bad repository name, bad token)
    // is logged and treated like missing credentials.
    pub fn from_config(config: &TrackerConfig) -> Self {
        match config {
            TrackerConfig::Disabled => Reconciler::Disabled,
            TrackerConfig::GitHub {
                token,
                repository,
                api_base,
            } => match GitHubTracker::new(token, repository, api_base) {
                Ok(tracker) => Reconciler::new(tracker),
                Err(e) => {
                    warn!(error = %e, "GitHub issue creation disabled");
                    Reconciler::Disabled
                }
            },
        }
    }
}

impl<T: Tracker> Reconciler<T> {
    pub fn new(tracker: T) -> Self {
        Reconciler::Enabled(ActiveReconciler {
            tracker,
            known: None,
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Reconciler::Enabled(_))
    }

    /// Number of URLs already tracked by open issues (fetches on first call)
    pub async fn existing_count(&mut self) -> usize {
        match self {
            Reconciler::Disabled => 0,
            Reconciler::Enabled(active) => active.known().await.len(),
        }
    }

    // Finds or creates the issue for one failure
    pub async fn reconcile(&mut self, record: &FailureRecord) -> Option<TicketRef> {
        match self {
            Reconciler::Disabled => None,
            Reconciler::Enabled(active) => active.reconcile(record).await,
        }
    }

    /// reconcile() for every failure, in order
    pub async fn reconcile_all(&mut self, records: &[FailureRecord]) -> Vec<Option<TicketRef>> {
        let mut tickets = Vec::with_capacity(records.len());
        for record in records {
            tickets.push(self.reconcile(record).await);
        }
        tickets
    }
}

impl<T: Tracker> ActiveReconciler<T> {
    async fn known(&mut self) -> &mut HashMap<String, u64> {
        if self.known.is_none() {
            let fetched = fetch_existing_issues(&self.tracker).await;
            self.known = Some(fetched);
        }
        self.known.get_or_insert_with(HashMap::new)
    }

    async fn reconcile(&mut self, record: &FailureRecord) -> Option<TicketRef> {
        if let Some(&number) = self.known().await.get(&record.url) {
            info!(url = %record.url, issue = number, "issue already exists");
            return Some(TicketRef::Existing(number));
        }

        match self.tracker.create_issue(&new_issue(record)).await {
            Ok(issue) => {
                info!(url = %record.url, issue = issue.number, "created issue");
                self.known()
                    .await
                    .insert(record.url.clone(), issue.number);
                Some(TicketRef::Created(issue.number))
            }
            Err(e) => {
                warn!(url = %record.url, error = %e, "failed to create issue");
                None
            }
        }
    }
}

// Pages through open broken-link issues and maps tracked URL -> issue number
//
// Stops at the first page shorter than PER_PAGE. Issues without the marker
// line are ignored; if two issues track the same URL the later one wins.
pub async fn fetch_existing_issues<T: Tracker + ?Sized>(tracker: &T) -> HashMap<String, u64> {
    let mut url_to_issue = HashMap::new();
    let mut page = 1;

    loop {
        let issues = match tracker
            .list_open_issues(BROKEN_LINK_LABEL, page, PER_PAGE)
            .await
        {
            Ok(issues) => issues,
            Err(e) => {
                warn!(page, error = %e, "failed to fetch existing issues");
                break;
            }
        };

        let count = issues.len();
        for issue in issues {
            if let Some(url) = issue.body.as_deref().and_then(extract_marked_url) {
                url_to_issue.insert(url.to_string(), issue.number);
            }
        }

        if count < PER_PAGE as usize {
            break;
        }
        page += 1;
    }

    url_to_issue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::LinkStatus;
    use crate::github::api::{NewIssue, RemoteIssue, TrackerError, GITHUB_API_BASE};
    use crate::github::issue::render_body;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // Everything the stub was asked to do
    #[derive(Default)]
    struct CallLog {
        list_pages: Vec<u32>,
        created: Vec<NewIssue>,
    }

    // In-memory tracker that serves canned pages and records calls
    struct StubTracker {
        pages: Vec<Vec<RemoteIssue>>,
        fail_list: bool,
        fail_create_for: Option<String>,
        next_number: Mutex<u64>,
        log: Arc<Mutex<CallLog>>,
    }

    impl StubTracker {
        fn new(pages: Vec<Vec<RemoteIssue>>) -> (Self, Arc<Mutex<CallLog>>) {
            let log = Arc::new(Mutex::new(CallLog::default()));
            let stub = StubTracker {
                pages,
                fail_list: false,
                fail_create_for: None,
                next_number: Mutex::new(1000),
                log: Arc::clone(&log),
            };
            (stub, log)
        }
    }

    #[async_trait]
    impl Tracker for StubTracker {
        async fn list_open_issues(
            &self,
            label: &str,
            page: u32,
            per_page: u32,
        ) -> Result<Vec<RemoteIssue>, TrackerError> {
            assert_eq!(label, "broken-link");
            assert_eq!(per_page, 100);
            self.log.lock().unwrap().list_pages.push(page);
            if self.fail_list {
                return Err(TrackerError::Status {
                    status: 502,
                    message: "bad gateway".to_string(),
                });
            }
            Ok(self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default())
        }

        async fn create_issue(&self, issue: &NewIssue) -> Result<RemoteIssue, TrackerError> {
            self.log.lock().unwrap().created.push(issue.clone());
            if let Some(url) = &self.fail_create_for {
                if issue.body.contains(url.as_str()) {
                    return Err(TrackerError::Status {
                        status: 422,
                        message: "validation failed".to_string(),
                    });
                }
            }
            let mut next = self.next_number.lock().unwrap();
            *next += 1;
            Ok(RemoteIssue {
                number: *next,
                body: Some(issue.body.clone()),
            })
        }
    }

    fn failure(url: &str, cell: usize) -> FailureRecord {
        FailureRecord {
            notebook: PathBuf::from("course/intro.ipynb"),
            cell,
            url: url.to_string(),
            status: LinkStatus::NotFound,
            status_code: 404,
            info: url.to_string(),
        }
    }

    fn tracked(number: u64, url: &str) -> RemoteIssue {
        RemoteIssue {
            number,
            body: Some(render_body(&failure(url, 0))),
        }
    }

    #[tokio::test]
    async fn test_same_url_twice_creates_one_issue() {
        let (stub, log) = StubTracker::new(vec![vec![]]);
        let mut reconciler = Reconciler::new(stub);

        let records = vec![
            failure("https://gone.example.com", 1),
            failure("https://gone.example.com", 5),
        ];
        let tickets = reconciler.reconcile_all(&records).await;

        assert_eq!(tickets[0], Some(TicketRef::Created(1001)));
        assert_eq!(tickets[1], Some(TicketRef::Existing(1001)));

        let log = log.lock().unwrap();
        assert_eq!(log.created.len(), 1);
        assert_eq!(log.list_pages, vec![1]);
    }

    #[tokio::test]
    async fn test_existing_issue_is_reused_without_writes() {
        let (stub, log) = StubTracker::new(vec![vec![
            tracked(7, "https://old.example.com"),
            RemoteIssue {
                number: 8,
                body: None,
            },
        ]]);
        let mut reconciler = Reconciler::new(stub);

        let ticket = reconciler.reconcile(&failure("https://old.example.com", 2)).await;
        assert_eq!(ticket, Some(TicketRef::Existing(7)));
        assert!(log.lock().unwrap().created.is_empty());
    }

    #[tokio::test]
    async fn test_existing_issues_fetched_once_per_run() {
        let (stub, log) = StubTracker::new(vec![vec![tracked(3, "https://a.example.com")]]);
        let mut reconciler = Reconciler::new(stub);

        assert_eq!(reconciler.existing_count().await, 1);
        reconciler
            .reconcile_all(&[
                failure("https://a.example.com", 0),
                failure("https://b.example.com", 1),
                failure("https://c.example.com", 2),
            ])
            .await;

        let log = log.lock().unwrap();
        assert_eq!(log.list_pages, vec![1]);
        assert_eq!(log.created.len(), 2);
    }

    #[tokio::test]
    async fn test_pagination_stops_after_empty_page() {
        let page_one: Vec<RemoteIssue> = (1..=100)
            .map(|n| tracked(n, &format!("https://site{}.example.com", n)))
            .collect();
        let (stub, log) = StubTracker::new(vec![page_one, vec![]]);

        let known = fetch_existing_issues(&stub).await;

        assert_eq!(log.lock().unwrap().list_pages, vec![1, 2]);
        assert_eq!(known.len(), 100);
        assert_eq!(known.get("https://site42.example.com"), Some(&42));
    }

    #[tokio::test]
    async fn test_pagination_stops_on_short_page() {
        let page_one: Vec<RemoteIssue> = (1..=100)
            .map(|n| tracked(n, &format!("https://p1-{}.example.com", n)))
            .collect();
        let page_two = vec![tracked(101, "https://p2.example.com")];
        let (stub, log) = StubTracker::new(vec![page_one, page_two]);

        let known = fetch_existing_issues(&stub).await;

        assert_eq!(log.lock().unwrap().list_pages, vec![1, 2]);
        assert_eq!(known.len(), 101);
    }

    #[tokio::test]
    async fn test_list_failure_yields_empty_map_and_still_creates() {
        let (mut stub, log) = StubTracker::new(vec![]);
        stub.fail_list = true;

        assert!(fetch_existing_issues(&stub).await.is_empty());

        let mut reconciler = Reconciler::new(stub);
        let ticket = reconciler.reconcile(&failure("https://x.example.com", 0)).await;
        assert_eq!(ticket, Some(TicketRef::Created(1001)));
        assert_eq!(log.lock().unwrap().created.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_does_not_block_later_records() {
        let (mut stub, log) = StubTracker::new(vec![vec![]]);
        stub.fail_create_for = Some("https://first.example.com".to_string());
        let mut reconciler = Reconciler::new(stub);

        let tickets = reconciler
            .reconcile_all(&[
                failure("https://first.example.com", 0),
                failure("https://second.example.com", 1),
            ])
            .await;

        assert_eq!(tickets, vec![None, Some(TicketRef::Created(1001))]);
        assert_eq!(log.lock().unwrap().created.len(), 2);
    }

    #[tokio::test]
    async fn test_created_issue_payload() {
        let (stub, log) = StubTracker::new(vec![vec![]]);
        let mut reconciler = Reconciler::new(stub);
        reconciler.reconcile(&failure("https://gone.example.com", 3)).await;

        let log = log.lock().unwrap();
        let issue = &log.created[0];
        assert_eq!(issue.title, "Broken link: https://gone.example.com");
        assert_eq!(issue.labels, vec!["broken-link", "automated"]);
        assert_eq!(extract_marked_url(&issue.body), Some("https://gone.example.com"));
    }

    #[tokio::test]
    async fn test_disabled_reconciler_yields_nothing() {
        let config = TrackerConfig::from_parts(None, Some("owner/repo".to_string()), GITHUB_API_BASE);
        let mut reconciler = Reconciler::from_config(&config);
        assert!(!reconciler.is_enabled());

        let records: Vec<_> = (0..5)
            .map(|i| failure(&format!("https://{}.example.com", i), i))
            .collect();
        let tickets = reconciler.reconcile_all(&records).await;

        assert_eq!(tickets.len(), 5);
        assert!(tickets.iter().all(Option::is_none));
        assert_eq!(reconciler.existing_count().await, 0);
    }

    #[tokio::test]
    async fn test_disabled_stub_reconciler_makes_no_calls() {
        let (_stub, log) = StubTracker::new(vec![vec![]]);
        let mut reconciler: Reconciler<StubTracker> = Reconciler::Disabled;

        let ticket = reconciler.reconcile(&failure("https://x.example.com", 0)).await;

        assert_eq!(ticket, None);
        let log = log.lock().unwrap();
        assert!(log.list_pages.is_empty());
        assert!(log.created.is_empty());
    }

    #[test]
    fn test_bad_repository_disables_reconciler() {
        let config = TrackerConfig::GitHub {
            token: "secret".to_string(),
            repository: "not-a-repo".to_string(),
            api_base: GITHUB_API_BASE.to_string(),
        };
        assert!(!Reconciler::from_config(&config).is_enabled());
    }
}
