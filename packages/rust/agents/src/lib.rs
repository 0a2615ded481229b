//! The five daily-brief agents and the capability interface they share.
//!
//! Each agent encapsulates one data domain behind the same two-operation
//! contract: `fetch` pulls a semantic record from the network, `render`
//! turns a record into a standalone Markdown fragment. The orchestration
//! core only ever sees [`Agent`] trait objects and never inspects a
//! concrete record's shape.

pub mod cyberpulse;
pub mod intel;
pub mod quote;
pub mod trending;
pub mod weather;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use dailybrief_shared::{AppConfig, BriefConfig, DailyBriefError, Result};

pub use cyberpulse::CyberPulseAgent;
pub use intel::IntelAgent;
pub use quote::QuoteAgent;
pub use trending::TrendingAgent;
pub use weather::WeatherAgent;

/// User-Agent string for all agent requests.
pub(crate) const USER_AGENT: &str = concat!("dailybrief/", env!("CARGO_PKG_VERSION"));

/// One data domain of the daily brief.
///
/// Failure is data, not unwinding: `fetch` returns `Err` for faults and
/// `Ok(None)` when the source produced nothing usable. `render` is pure
/// formatting over the record `fetch` produced.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable roster name, also the artifact file key (lower-cased).
    fn name(&self) -> &'static str;

    /// Pull a semantic record from the agent's source.
    async fn fetch(&self) -> Result<Option<Value>>;

    /// Render a fetched record as a standalone Markdown fragment.
    fn render(&self, data: &Value) -> String;
}

/// Build the fixed agent roster, in presentation order.
///
/// The order here defines the section order of every composite document:
/// Quote, Weather, Intel, CyberPulse, Trending.
pub fn roster(config: &AppConfig, brief: &BriefConfig) -> Result<Vec<Arc<dyn Agent>>> {
    Ok(vec![
        Arc::new(QuoteAgent::new(brief.timeout_secs)?),
        Arc::new(WeatherAgent::new(config.location.clone(), brief.timeout_secs)?),
        Arc::new(IntelAgent::new(
            config.feeds.news.clone(),
            brief.max_items,
            brief.timeout_secs,
        )?),
        Arc::new(CyberPulseAgent::new(
            config.feeds.cyber.clone(),
            brief.max_items,
            brief.timeout_secs,
        )?),
        Arc::new(TrendingAgent::new(
            config.trending.clone(),
            brief.max_items,
            brief.timeout_secs,
        )?),
    ])
}

/// Build the HTTP client every agent uses for its fetches.
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DailyBriefError::Network(format!("failed to build HTTP client: {e}")))
}
