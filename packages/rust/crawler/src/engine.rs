//! Concurrent frontier crawler.
//!
//! A fixed pool of workers pulls tasks from a shared queue that grows while
//! the crawl runs. Every discovered URL passes through one test-and-insert on
//! the visited set, so each URL is fetched at most once. The crawl ends when
//! the outstanding counter (queued + in flight) reaches zero; the counter is
//! only touched under the same lock as the visited set.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use franchise_shared::{CrawlConfig, DetailRecord, FranchiseError, Result};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::extract::{Extracted, FieldExtractor, FranchisePageExtractor};
use crate::fetch::{Fetcher, HttpFetcher, HttpSession};

// ---------------------------------------------------------------------------
// CrawlResult
// ---------------------------------------------------------------------------

/// A record together with where and when its page was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledRecord {
    /// Page the record was extracted from.
    pub url: Url,
    /// Order in which the URL entered the visited set (seed = 0).
    pub discovery_index: usize,
    /// Extracted fields.
    pub record: DetailRecord,
}

/// Terminal state of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Successful pages in discovery order.
    records: Vec<CrawledRecord>,
    /// Pages whose fetch failed (URL, reason).
    pub failures: Vec<(String, String)>,
    /// Distinct URLs submitted for fetching.
    pub urls_visited: usize,
    /// Wall time of the crawl.
    pub duration: Duration,
}

impl CrawlResult {
    /// True when no page, the seed included, could be processed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of successfully processed pages.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records in discovery order.
    pub fn records(&self) -> &[CrawledRecord] {
        &self.records
    }

    /// Consume the result, yielding records in discovery order.
    pub fn into_records(self) -> Vec<CrawledRecord> {
        self.records
    }
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Bounded-worker crawler over an a-priori unknown link graph.
pub struct Crawler {
    workers: usize,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn FieldExtractor>,
}

impl Crawler {
    /// Create a crawler from explicit collaborators.
    pub fn new(
        workers: usize,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(FranchiseError::config("crawler needs at least one worker"));
        }
        Ok(Self {
            workers,
            fetcher,
            extractor,
        })
    }

    /// Create a crawler that fetches through an established session.
    pub fn with_session(config: &CrawlConfig, session: &HttpSession) -> Result<Self> {
        Self::new(
            config.workers,
            Arc::new(HttpFetcher::new(session)),
            Arc::new(FranchisePageExtractor::new(session.base_url().clone())),
        )
    }

    /// Crawl from `seed` until no unvisited links remain.
    ///
    /// A page whose fetch fails (or whose task panics) is dropped and
    /// recorded in `failures`; an empty result means every page, the seed
    /// included, failed.
    #[instrument(skip_all, fields(seed = %seed, workers = self.workers))]
    pub async fn crawl(&self, seed: Url) -> CrawlResult {
        let start = Instant::now();
        let frontier = Arc::new(Frontier::seeded(seed));

        info!("starting crawl");

        let mut pool = JoinSet::new();
        for worker_id in 0..self.workers {
            pool.spawn(run_worker(
                worker_id,
                frontier.clone(),
                self.fetcher.clone(),
                self.extractor.clone(),
            ));
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "crawl worker aborted");
            }
        }

        let mut state = frontier.state.lock().await;
        let mut records = std::mem::take(&mut state.records);
        records.sort_by_key(|r| r.discovery_index);

        let result = CrawlResult {
            records,
            failures: std::mem::take(&mut state.failures),
            urls_visited: state.visited.len(),
            duration: start.elapsed(),
        };

        info!(
            records = result.len(),
            urls_visited = result.urls_visited,
            failures = result.failures.len(),
            duration_ms = result.duration.as_millis(),
            "crawl completed"
        );

        result
    }
}

/// Worker loop: take a task, fetch and extract, report back, repeat.
async fn run_worker(
    worker_id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn FieldExtractor>,
) {
    while let Some(task) = frontier.next_task().await {
        debug!(worker_id, url = %task.url, index = task.index, "processing task");

        // Run the page in its own task so a panic still retires it.
        let page = {
            let url = task.url.clone();
            let fetcher = fetcher.clone();
            let extractor = extractor.clone();
            tokio::spawn(async move {
                fetcher
                    .fetch(&url)
                    .await
                    .map(|html| extractor.extract(&html))
            })
        };
        let outcome = page
            .await
            .unwrap_or_else(|e| Err(FranchiseError::TaskAborted(e.to_string())));

        frontier.complete(task, outcome).await;
    }
    debug!(worker_id, "worker idle, frontier drained");
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// One URL awaiting or undergoing a fetch.
#[derive(Debug)]
struct Task {
    url: Url,
    index: usize,
}

/// Crawl-scoped mutable state; every field is guarded by one lock.
#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    queue: VecDeque<Task>,
    /// Queued plus in-flight tasks.
    outstanding: usize,
    records: Vec<CrawledRecord>,
    failures: Vec<(String, String)>,
}

impl FrontierState {
    /// Test-and-insert into the visited set; queue a task if the URL is new.
    fn submit(&mut self, url: Url) -> bool {
        if !self.visited.insert(url.as_str().to_owned()) {
            return false;
        }
        let index = self.visited.len() - 1;
        self.queue.push_back(Task { url, index });
        self.outstanding += 1;
        true
    }
}

struct Frontier {
    state: Mutex<FrontierState>,
    /// Signalled when work is queued or the frontier drains.
    wake: Notify,
}

impl Frontier {
    fn seeded(seed: Url) -> Self {
        let mut state = FrontierState::default();
        state.submit(seed);
        Self {
            state: Mutex::new(state),
            wake: Notify::new(),
        }
    }

    /// Next queued task, or `None` once nothing is queued or in flight.
    async fn next_task(&self) -> Option<Task> {
        loop {
            // Register for wakeups before inspecting state so a notification
            // sent between the check and the await is not lost.
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if let Some(task) = state.queue.pop_front() {
                    return Some(task);
                }
                if state.outstanding == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Record a finished task, submit its new links, and retire it.
    async fn complete(&self, task: Task, outcome: Result<Extracted>) {
        let mut state = self.state.lock().await;
        let mut submitted = 0usize;

        match outcome {
            Ok(extracted) => {
                for link in extracted.links {
                    if state.submit(link) {
                        submitted += 1;
                    }
                }
                state.records.push(CrawledRecord {
                    url: task.url,
                    discovery_index: task.index,
                    record: extracted.record,
                });
            }
            Err(e) => {
                warn!(url = %task.url, error = %e, "fetch failed, dropping page");
                state.failures.push((task.url.to_string(), e.to_string()));
            }
        }

        state.outstanding -= 1;
        let drained = state.outstanding == 0;
        drop(state);

        if submitted > 0 || drained {
            self.wake.notify_waiters();
        }
    }
}
