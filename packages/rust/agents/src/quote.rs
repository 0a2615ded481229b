//! Quote of the Day agent.
//!
//! Tries ZenQuotes, falls back to quotable.io, and finally to a fixed
//! quote table keyed by day of month, so this agent effectively never
//! comes up empty.

use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use dailybrief_shared::Result;

use crate::{Agent, http_client};

const ZENQUOTES_API: &str = "https://zenquotes.io/api/today";
const QUOTABLE_API: &str = "https://api.quotable.io/random";

/// Offline fallback quotes, indexed by day-of-month modulo table length.
const FALLBACK_QUOTES: &[(&str, &str)] = &[
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Innovation distinguishes between a leader and a follower.", "Steve Jobs"),
    ("Stay hungry, stay foolish.", "Steve Jobs"),
    ("The best way to predict the future is to invent it.", "Alan Kay"),
    ("Code is like humor. When you have to explain it, it's bad.", "Cory House"),
    ("First, solve the problem. Then, write the code.", "John Johnson"),
    ("Experience is the name everyone gives to their mistakes.", "Oscar Wilde"),
    ("Knowledge is power.", "Francis Bacon"),
    ("In order to be irreplaceable, one must always be different.", "Coco Chanel"),
    ("The only impossible journey is the one you never begin.", "Tony Robbins"),
];

/// The semantic record this agent produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    pub author: String,
}

/// Agent fetching the daily inspirational quote.
pub struct QuoteAgent {
    client: Client,
    zenquotes_url: Url,
    quotable_url: Url,
}

impl QuoteAgent {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            zenquotes_url: Url::parse(ZENQUOTES_API).expect("valid endpoint"),
            quotable_url: Url::parse(QUOTABLE_API).expect("valid endpoint"),
        })
    }

    #[cfg(test)]
    fn with_endpoints(mut self, zenquotes: Url, quotable: Url) -> Self {
        self.zenquotes_url = zenquotes;
        self.quotable_url = quotable;
        self
    }

    /// ZenQuotes responds with `[{"q": "...", "a": "..."}]`.
    async fn fetch_zenquotes(&self) -> Option<QuoteRecord> {
        let response = self
            .client
            .get(self.zenquotes_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .ok()?;

        let body: Vec<Value> = response.json().await.ok()?;
        let first = body.first()?;
        let text = first.get("q")?.as_str()?.to_string();
        if text.is_empty() {
            return None;
        }
        let author = first
            .get("a")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        Some(QuoteRecord { text, author })
    }

    /// quotable.io responds with `{"content": "...", "author": "..."}`.
    async fn fetch_quotable(&self) -> Option<QuoteRecord> {
        let response = self
            .client
            .get(self.quotable_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .ok()?;

        let body: Value = response.json().await.ok()?;
        let text = body.get("content")?.as_str()?.to_string();
        if text.is_empty() {
            return None;
        }
        let author = body
            .get("author")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        Some(QuoteRecord { text, author })
    }

    fn fallback_quote(&self) -> QuoteRecord {
        let index = Utc::now().day() as usize % FALLBACK_QUOTES.len();
        let (text, author) = FALLBACK_QUOTES[index];
        QuoteRecord {
            text: text.to_string(),
            author: author.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Agent for QuoteAgent {
    fn name(&self) -> &'static str {
        "Quote"
    }

    async fn fetch(&self) -> Result<Option<Value>> {
        let record = match self.fetch_zenquotes().await {
            Some(record) => record,
            None => {
                debug!("ZenQuotes failed, trying quotable.io");
                match self.fetch_quotable().await {
                    Some(record) => record,
                    None => {
                        warn!("all quote APIs failed, using fallback table");
                        self.fallback_quote()
                    }
                }
            }
        };

        info!(author = %record.author, "quote fetched");
        Ok(Some(serde_json::to_value(record).expect("record serializes")))
    }

    fn render(&self, data: &Value) -> String {
        let Ok(record) = serde_json::from_value::<QuoteRecord>(data.clone()) else {
            return "**Quote unavailable** ⛔\n".to_string();
        };
        if record.text.is_empty() {
            return "**Quote unavailable** ⛔\n".to_string();
        }

        let mut md = String::from("### 💭 Quote of the Day\n\n");
        md.push_str(&format!("> \"{}\"\n", record.text));
        md.push_str(">\n");
        md.push_str(&format!("> — **{}**\n", record.author));
        md
    }
}
