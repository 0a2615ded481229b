//! Shared types, error model, and configuration for the daily brief generator.
//!
//! This crate is the foundation depended on by all other dailybrief crates.
//! It provides:
//! - [`DailyBriefError`] — the unified error type
//! - Domain types ([`AgentResult`], [`StatusRecord`], [`RunReport`], [`RunId`])
//! - The sentinel marker constants ([`BEGIN_MARKER`], [`END_MARKER`])
//! - Configuration ([`AppConfig`], [`BriefConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BriefConfig, DefaultsConfig, FeedSource, FeedsConfig, LocationConfig,
    TrendingConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DailyBriefError, Result};
pub use types::{
    AgentResult, AgentStatus, BEGIN_MARKER, END_MARKER, RunId, RunReport, StatusRecord,
};
