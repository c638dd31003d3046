//! Shared types, error model, and configuration for the franchise workspace.
//!
//! This crate is the foundation depended on by all other franchise crates.
//! It provides:
//! - [`FranchiseError`]: the unified error type
//! - Domain types ([`DetailRecord`], [`UNKNOWN`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], [`SearchOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, SearchOptions, ServerConfig, SourceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{FranchiseError, Result};
pub use types::{DetailRecord, UNKNOWN};
