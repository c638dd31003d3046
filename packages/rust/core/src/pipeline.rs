//! End-to-end lookup: query → session → seed search → crawl → sorted records.

use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use franchise_crawler::{Crawler, HttpSession};
use franchise_discovery::SeedResult;
use franchise_shared::{
    AppConfig, CrawlConfig, DetailRecord, FranchiseError, Result, SearchOptions,
};

use crate::aggregate;

/// Configuration for one lookup.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Crawl and session settings.
    pub crawl: CrawlConfig,
    /// Seed search settings.
    pub search: SearchOptions,
}

impl TryFrom<&AppConfig> for LookupConfig {
    type Error = FranchiseError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            crawl: CrawlConfig::try_from(config)?,
            search: SearchOptions::try_from(config)?,
        })
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct Lookup {
    /// Title page the crawl started from.
    pub seed: Url,
    /// Franchise records sorted by year.
    pub records: Vec<DetailRecord>,
    /// Pages that were discovered but could not be fetched.
    pub pages_failed: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run a full franchise lookup for `query`.
///
/// 1. Establish a request-scoped upstream session
/// 2. Search for the seed title page
/// 3. Crawl the franchise from the seed
/// 4. Sort records by year
///
/// Errors: [`FranchiseError::Validation`] for an empty query,
/// [`FranchiseError::SeedNotFound`] when the search has no result,
/// [`FranchiseError::Timeout`]/[`FranchiseError::Network`] when the session
/// or search request fails, and [`FranchiseError::NoData`] when every page
/// of the crawl failed.
#[instrument(skip_all, fields(query = %query))]
pub async fn lookup_franchise(config: &LookupConfig, query: &str) -> Result<Lookup> {
    let start = Instant::now();
    let query = query.trim();
    if query.is_empty() {
        return Err(FranchiseError::validation("query must not be empty"));
    }

    info!("starting lookup");

    // --- Phase 1: Session ---
    let session = HttpSession::establish(&config.crawl).await?;

    // --- Phase 2: Seed ---
    let seed = match franchise_discovery::find_seed(session.client(), &config.search, query).await? {
        SeedResult::Found(url) => url,
        SeedResult::NotFound => {
            return Err(FranchiseError::SeedNotFound {
                query: query.to_string(),
            });
        }
    };

    // --- Phase 3: Crawl ---
    let crawler = Crawler::with_session(&config.crawl, &session)?;
    let result = crawler.crawl(seed.clone()).await;

    if result.is_empty() {
        return Err(FranchiseError::NoData {
            seed: seed.to_string(),
        });
    }

    // --- Phase 4: Order ---
    let pages_failed = result.failures.len();
    let records = aggregate::sort_by_year(result.into_records());

    let lookup = Lookup {
        seed,
        records,
        pages_failed,
        elapsed: start.elapsed(),
    };

    info!(
        records = lookup.records.len(),
        pages_failed = lookup.pages_failed,
        elapsed_ms = lookup.elapsed.as_millis(),
        "lookup completed"
    );

    Ok(lookup)
}
