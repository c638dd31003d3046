//! Franchise crawler: page fetching, field extraction, and the concurrent
//! frontier that expands a franchise from one seed page.
//!
//! This crate provides:
//! - [`extract`]: Field extraction from franchise pages
//! - [`fetch`]: The HTTP session and the [`Fetcher`] seam used by the engine
//! - [`engine`]: Bounded worker pool over a dynamically growing frontier

pub mod engine;
pub mod extract;
pub mod fetch;

pub use engine::{CrawlResult, CrawledRecord, Crawler};
pub use extract::{Extracted, FieldExtractor, FranchisePageExtractor};
pub use fetch::{Fetcher, HttpFetcher, HttpSession};
