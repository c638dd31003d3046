//! HTTP endpoint for franchise lookups.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search-franchise?q=<title>` | Sorted franchise records |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error contract
//!
//! Errors are `{"error": "<message>"}` with:
//! `400` missing `q`, `404` title not found, `502` upstream unavailable,
//! `504` upstream timeout, `500` nothing could be extracted or internal failure.
//!
//! All origins, methods, and headers are permitted (CORS) so browser front
//! ends can call the endpoint directly.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use color_eyre::eyre::Result;
use franchise_core::{LookupConfig, lookup_franchise};
use franchise_shared::{DetailRecord, FranchiseError};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
    lookup: Arc<LookupConfig>,
}

/// Bind `addr` and serve until the process is terminated.
pub(crate) async fn run_server(addr: &str, lookup: LookupConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(lookup)).await?;
    Ok(())
}

/// Build the application router.
pub(crate) fn router(lookup: LookupConfig) -> Router {
    let state = AppState {
        lookup: Arc::new(lookup),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search-franchise", get(handle_search_franchise))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error that converts into an HTTP response.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<FranchiseError> for ApiError {
    fn from(err: FranchiseError) -> Self {
        match err {
            FranchiseError::Validation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Query parameter 'q' is required")
            }
            FranchiseError::SeedNotFound { query } => {
                Self::new(StatusCode::NOT_FOUND, format!("Movie '{query}' not found"))
            }
            FranchiseError::Timeout(detail) => {
                warn!(%detail, "upstream timeout");
                Self::new(
                    StatusCode::GATEWAY_TIMEOUT,
                    "Upstream site did not respond in time",
                )
            }
            FranchiseError::Network(detail) => {
                warn!(%detail, "upstream unavailable");
                Self::new(StatusCode::BAD_GATEWAY, "Upstream site is unavailable")
            }
            FranchiseError::NoData { seed } => {
                warn!(%seed, "no page of the franchise could be fetched");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not extract franchise data",
                )
            }
            other => {
                error!(error = %other, "lookup failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during parsing",
                )
            }
        }
    }
}

// ============ GET /search-franchise ============

/// Query string for `GET /search-franchise`.
#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Handler for `GET /search-franchise`.
async fn handle_search_franchise(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<DetailRecord>>, ApiError> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Query parameter 'q' is required"))?;

    info!(query, "franchise lookup requested");

    let lookup = lookup_franchise(&state.lookup, query).await?;
    Ok(Json(lookup.records))
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use franchise_shared::{CrawlConfig, SearchOptions};
    use serde_json::Value;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn lookup_for(upstream: &MockServer) -> LookupConfig {
        let base = Url::parse(&upstream.uri()).unwrap();
        LookupConfig {
            crawl: CrawlConfig {
                base_url: base.clone(),
                user_agent: "franchise-test".into(),
                workers: 4,
                fetch_timeout: Duration::from_secs(2),
            },
            search: SearchOptions {
                base_url: base,
                timeout: Duration::from_secs(2),
            },
        }
    }

    /// Serve the router on an ephemeral port and return its base URL.
    async fn spawn_app(lookup: LookupConfig) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(lookup)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn get(url: &str) -> (StatusCode, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    async fn mount_page(server: &MockServer, p: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn title_page(title: &str, year: Option<&str>, links: &[&str]) -> String {
        let year_row = year
            .map(|y| format!("<tr><td>Год:</td><td>{y}</td></tr>"))
            .unwrap_or_default();
        let items: String = links
            .iter()
            .map(|l| format!(r#"<div class="b-post__partcontent_item"><a href="{l}">x</a></div>"#))
            .collect();
        format!(
            r#"<html><body><div class="b-post__origtitle">{title}</div>
            <table class="b-post__info">{year_row}</table>{items}</body></html>"#
        )
    }

    fn search_page(href: &str) -> String {
        format!(r#"<div class="b-content__inline_item-link"><a href="{href}">r</a></div>"#)
    }

    #[tokio::test]
    async fn missing_query_is_bad_request_without_upstream_calls() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let app = spawn_app(lookup_for(&upstream)).await;

        for url in [
            format!("{app}/search-franchise"),
            format!("{app}/search-franchise?q="),
            format!("{app}/search-franchise?q=%20%20"),
        ] {
            let (status, body) = get(&url).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Query parameter 'q' is required");
        }
    }

    #[tokio::test]
    async fn returns_sorted_franchise() {
        let upstream = MockServer::start().await;
        mount_page(&upstream, "/", String::new()).await;
        mount_page(&upstream, "/search/", search_page("/a.html")).await;
        mount_page(&upstream, "/a.html", title_page("A", Some("2003"), &["/b.html", "/c.html"])).await;
        mount_page(&upstream, "/b.html", title_page("B", Some("1999"), &["/c.html"])).await;
        mount_page(&upstream, "/c.html", title_page("C", None, &[])).await;

        let app = spawn_app(lookup_for(&upstream)).await;
        let (status, body) = get(&format!("{app}/search-franchise?q=a")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                {"english_title": "B", "year": "1999"},
                {"english_title": "A", "year": "2003"},
                {"english_title": "C", "year": "N/A"},
            ])
        );
    }

    #[tokio::test]
    async fn unknown_title_is_not_found() {
        let upstream = MockServer::start().await;
        mount_page(&upstream, "/", String::new()).await;
        mount_page(&upstream, "/search/", "<html></html>".into()).await;

        let app = spawn_app(lookup_for(&upstream)).await;
        let (status, body) = get(&format!("{app}/search-franchise?q=Nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Movie 'Nope' not found");
    }

    #[tokio::test]
    async fn upstream_outage_is_bad_gateway() {
        let upstream = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&upstream)
            .await;

        let app = spawn_app(lookup_for(&upstream)).await;
        let (status, body) = get(&format!("{app}/search-franchise?q=x")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn slow_search_is_gateway_timeout() {
        let upstream = MockServer::start().await;
        mount_page(&upstream, "/", String::new()).await;
        Mock::given(path("/search/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(search_page("/a.html"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&upstream)
            .await;

        let mut lookup = lookup_for(&upstream);
        lookup.search.timeout = Duration::from_millis(300);
        let app = spawn_app(lookup).await;
        let (status, body) = get(&format!("{app}/search-franchise?q=slow")).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "Upstream site did not respond in time");
    }

    #[tokio::test]
    async fn failed_seed_fetch_is_server_error() {
        let upstream = MockServer::start().await;
        mount_page(&upstream, "/", String::new()).await;
        mount_page(&upstream, "/search/", search_page("/gone.html")).await;
        Mock::given(path("/gone.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&upstream)
            .await;

        let app = spawn_app(lookup_for(&upstream)).await;
        let (status, body) = get(&format!("{app}/search-franchise?q=gone")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Could not extract franchise data");
    }

    #[tokio::test]
    async fn health_reports_version() {
        let upstream = MockServer::start().await;
        let app = spawn_app(lookup_for(&upstream)).await;

        let (status, body) = get(&format!("{app}/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
