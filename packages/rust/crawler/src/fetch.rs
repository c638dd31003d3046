//! HTTP session and the fetch seam used by the crawl engine.
//!
//! An [`HttpSession`] is created once per lookup, before any worker starts:
//! it owns the cookie jar populated by a single bootstrap request. Workers
//! only read from it afterwards.

use std::time::Duration;

use async_trait::async_trait;
use franchise_shared::{CrawlConfig, FranchiseError, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument};
use url::Url;

/// Maximum number of redirects followed for any upstream request.
const MAX_REDIRECTS: usize = 5;

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// One network retrieval: URL in, page text out.
///
/// Transport errors, non-success statuses and timeouts all surface as `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the page at `url` and return its body.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HttpSession
// ---------------------------------------------------------------------------

/// Request-scoped upstream session (client + cookie jar).
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    base_url: Url,
}

impl HttpSession {
    /// Build the client and visit the base origin once to establish cookies.
    #[instrument(skip_all, fields(base_url = %config.base_url))]
    pub async fn establish(config: &CrawlConfig) -> Result<Self> {
        let session = Self {
            client: build_client(config)?,
            base_url: config.base_url.clone(),
        };

        let response = session
            .client
            .get(session.base_url.as_str())
            .send()
            .await
            .map_err(|e| FranchiseError::from_reqwest(&session.base_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FranchiseError::Network(format!(
                "{}: session bootstrap returned HTTP {status}",
                session.base_url
            )));
        }

        info!(%status, "upstream session established");
        Ok(session)
    }

    /// Shared client; clones share the same cookie jar.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Origin the session was established against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Build a reqwest client with the fixed header set and timeouts.
fn build_client(config: &CrawlConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .connect_timeout(CONNECT_TIMEOUT.min(config.fetch_timeout))
        .timeout(config.fetch_timeout)
        .build()
        .map_err(|e| FranchiseError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`Fetcher`] backed by an established [`HttpSession`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Fetch through the session's client and cookie jar.
    pub fn new(session: &HttpSession) -> Self {
        Self {
            client: session.client.clone(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FranchiseError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FranchiseError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| FranchiseError::from_reqwest(url, e))
    }
}
