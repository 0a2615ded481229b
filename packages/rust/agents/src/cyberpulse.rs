//! Cyber Pulse agent — security headlines from vendor feeds, with favicons.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use dailybrief_feed::{extract_items, truncate};
use dailybrief_shared::{FeedSource, Result};

use crate::{Agent, http_client};

/// Items pulled from each feed before merging.
const ITEMS_PER_FEED: usize = 5;

/// Cleaned description length cap.
const DESCRIPTION_CHARS: usize = 250;

/// One security headline in the semantic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub published: DateTime<Utc>,
}

/// Agent fetching cybersecurity headlines.
pub struct CyberPulseAgent {
    client: Client,
    feeds: Vec<FeedSource>,
    max_headlines: usize,
}

impl CyberPulseAgent {
    pub fn new(feeds: Vec<FeedSource>, max_headlines: usize, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            feeds,
            max_headlines,
        })
    }

    async fn fetch_feed(
        &self,
        feed: &FeedSource,
        fallback_date: DateTime<Utc>,
    ) -> Vec<HeadlineRecord> {
        let result = self
            .client
            .get(feed.url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(feed = %feed.name, error = %e, "failed to fetch feed");
                return Vec::new();
            }
        };

        let xml = match response.text().await {
            Ok(xml) => xml,
            Err(e) => {
                warn!(feed = %feed.name, error = %e, "failed to read feed body");
                return Vec::new();
            }
        };

        let favicon = feed.favicon.as_ref().map(|f| f.to_string());

        extract_items(&xml, &feed.name, ITEMS_PER_FEED)
            .into_iter()
            .map(|item| HeadlineRecord {
                title: item.title,
                link: item.link,
                description: truncate(&item.description, DESCRIPTION_CHARS),
                source: item.source,
                favicon: favicon.clone(),
                published: item.published.unwrap_or(fallback_date),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Agent for CyberPulseAgent {
    fn name(&self) -> &'static str {
        "CyberPulse"
    }

    async fn fetch(&self) -> Result<Option<Value>> {
        let fallback_date = Utc::now();
        let mut headlines = Vec::new();

        for feed in &self.feeds {
            let fetched = self.fetch_feed(feed, fallback_date).await;
            if !fetched.is_empty() {
                info!(feed = %feed.name, count = fetched.len(), "fetched headlines");
                headlines.extend(fetched);
            }
        }

        if headlines.is_empty() {
            return Ok(None);
        }

        headlines.sort_by(|a, b| b.published.cmp(&a.published));
        headlines.truncate(self.max_headlines);

        Ok(Some(
            serde_json::to_value(headlines).expect("record serializes"),
        ))
    }

    fn render(&self, data: &Value) -> String {
        let headlines: Vec<HeadlineRecord> = match serde_json::from_value(data.clone()) {
            Ok(headlines) => headlines,
            Err(_) => Vec::new(),
        };

        if headlines.is_empty() {
            return "**No cybersecurity headlines available** ⛔\n".to_string();
        }

        let mut md = String::from("## 🔐 Cyber Pulse Report\n\n");

        let count = headlines.len();
        for (i, headline) in headlines.iter().enumerate() {
            if let Some(favicon) = &headline.favicon {
                md.push_str(&format!("![icon]({favicon}) "));
            }
            md.push_str(&format!("**[{}]({})**\n\n", headline.title, headline.link));
            md.push_str(&format!("_Source: {}_\n\n", headline.source));
            md.push_str(&format!("{}\n\n", headline.description));
            md.push_str(&format!("📅 {}\n\n", headline.published.format("%B %d, %Y")));

            if i + 1 < count {
                md.push_str("---\n\n");
            }
        }

        md
    }
}
