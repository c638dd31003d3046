//! Seed discovery: resolve a free-text title query to the title page that
//! starts a franchise crawl.
//!
//! One request against the upstream search page; the first result wins.
//! "No result" is a normal outcome ([`SeedResult::NotFound`]); transport
//! failures and timeouts are errors the endpoint reports as gateway errors.

mod parser;

use franchise_shared::{FranchiseError, Result, SearchOptions};
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

pub use parser::first_result;

/// Path of the upstream search page.
const SEARCH_PATH: &str = "/search/";

// ---------------------------------------------------------------------------
// SeedResult
// ---------------------------------------------------------------------------

/// Outcome of a seed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedResult {
    /// The first search result's title page.
    Found(Url),
    /// The search returned no results.
    NotFound,
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Search for `query` and return the first result's page URL.
///
/// `client` should be the lookup's established session client so the search
/// carries the same cookies as the crawl that follows.
#[instrument(skip_all, fields(query = %query))]
pub async fn find_seed(client: &Client, opts: &SearchOptions, query: &str) -> Result<SeedResult> {
    let query = query.trim();
    if query.is_empty() {
        return Err(FranchiseError::validation("search query must not be empty"));
    }

    let search_url = search_url(&opts.base_url, query)?;
    info!(%search_url, "searching for seed");

    let response = client
        .get(search_url.as_str())
        .timeout(opts.timeout)
        .send()
        .await
        .map_err(|e| FranchiseError::from_reqwest(&search_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FranchiseError::Network(format!(
            "{search_url}: HTTP {status}"
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FranchiseError::from_reqwest(&search_url, e))?;

    match parser::first_result(&body, &opts.base_url) {
        Some(seed) => {
            info!(%seed, "seed found");
            Ok(SeedResult::Found(seed))
        }
        None => {
            debug!("search returned no results");
            Ok(SeedResult::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build `{base}/search/?do=search&subaction=search&q={query}` (form-encoded).
fn search_url(base: &Url, query: &str) -> Result<Url> {
    let mut url = base.join(SEARCH_PATH).map_err(|e| {
        FranchiseError::config(format!("cannot build search URL from {base}: {e}"))
    })?;
    url.query_pairs_mut()
        .append_pair("do", "search")
        .append_pair("subaction", "search")
        .append_pair("q", query);
    Ok(url)
}
