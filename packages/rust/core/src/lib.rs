//! Core lookup orchestration for the franchise service.
//!
//! This crate ties together seed discovery, the frontier crawl, and result
//! ordering into one end-to-end lookup (see [`pipeline::lookup_franchise`]).

pub mod aggregate;
pub mod pipeline;

pub use aggregate::sort_by_year;
pub use pipeline::{Lookup, LookupConfig, lookup_franchise};
