//! Trending agent — repositories recently created and heavily starred.
//!
//! Primary source is the GitHub search API; the gitterapp trending API is
//! the fallback. Rendered as a Markdown table.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use dailybrief_feed::truncate;
use dailybrief_shared::{Result, TrendingConfig};

use crate::{Agent, http_client};

const GITHUB_SEARCH_API: &str = "https://api.github.com/search/repositories";
const GITTERAPP_API: &str = "https://api.gitterapp.com/repositories";

/// Description column width in the rendered table.
const DESCRIPTION_CHARS: usize = 60;

/// One trending repository in the semantic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub full_name: String,
    pub author: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
    pub url: String,
}

/// Agent fetching trending GitHub repositories.
pub struct TrendingAgent {
    client: Client,
    search_url: Url,
    fallback_url: Url,
    trending: TrendingConfig,
    max_repos: usize,
}

impl TrendingAgent {
    pub fn new(trending: TrendingConfig, max_repos: usize, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            search_url: Url::parse(GITHUB_SEARCH_API).expect("valid endpoint"),
            fallback_url: Url::parse(GITTERAPP_API).expect("valid endpoint"),
            trending,
            max_repos,
        })
    }

    #[cfg(test)]
    fn with_endpoints(mut self, search: Url, fallback: Url) -> Self {
        self.search_url = search;
        self.fallback_url = fallback;
        self
    }

    /// Repos created inside the lookback window, sorted by stars.
    async fn fetch_from_search(&self) -> Option<Vec<RepoRecord>> {
        let since = (Utc::now() - Duration::days(self.trending.lookback_days))
            .format("%Y-%m-%d")
            .to_string();

        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("q", format!("created:>{since}")),
                ("sort", "stars".to_string()),
                ("order", "desc".to_string()),
                ("per_page", self.trending.per_page.to_string()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .ok()?;

        let body: Value = response.json().await.ok()?;
        let items = body.get("items")?.as_array()?;
        if items.is_empty() {
            return None;
        }

        let repos = items
            .iter()
            .map(|item| RepoRecord {
                name: text_field(item, "name"),
                full_name: text_field(item, "full_name"),
                author: item
                    .pointer("/owner/login")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: item
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("No description")
                    .to_string(),
                stars: count_field(item, "stargazers_count"),
                forks: count_field(item, "forks_count"),
                language: item
                    .get("language")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
                url: text_field(item, "html_url"),
            })
            .collect();

        Some(repos)
    }

    /// gitterapp returns a bare array with flatter field names.
    async fn fetch_from_gitterapp(&self) -> Option<Vec<RepoRecord>> {
        let response = self
            .client
            .get(self.fallback_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .ok()?;

        let body: Vec<Value> = response.json().await.ok()?;
        if body.is_empty() {
            return None;
        }

        let repos = body
            .iter()
            .take(self.trending.per_page)
            .map(|item| {
                let full_name = item
                    .get("full_name")
                    .and_then(Value::as_str)
                    .unwrap_or_else(|| item.get("name").and_then(Value::as_str).unwrap_or_default())
                    .to_string();
                let url = item
                    .get("url")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("https://github.com/{full_name}"));

                RepoRecord {
                    name: text_field(item, "name"),
                    full_name,
                    author: text_field(item, "author"),
                    description: item
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or("No description")
                        .to_string(),
                    stars: count_field(item, "stars"),
                    forks: count_field(item, "forks"),
                    language: item
                        .get("language")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown")
                        .to_string(),
                    url,
                }
            })
            .collect();

        Some(repos)
    }
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn count_field(item: &Value, key: &str) -> u64 {
    item.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[async_trait::async_trait]
impl Agent for TrendingAgent {
    fn name(&self) -> &'static str {
        "Trending"
    }

    async fn fetch(&self) -> Result<Option<Value>> {
        let mut repos = match self.fetch_from_search().await {
            Some(repos) => repos,
            None => {
                debug!("GitHub search failed, trying gitterapp");
                match self.fetch_from_gitterapp().await {
                    Some(repos) => repos,
                    None => return Ok(None),
                }
            }
        };

        repos.truncate(self.max_repos);
        info!(count = repos.len(), "trending repos fetched");

        Ok(Some(serde_json::to_value(repos).expect("record serializes")))
    }

    fn render(&self, data: &Value) -> String {
        let repos: Vec<RepoRecord> = match serde_json::from_value(data.clone()) {
            Ok(repos) => repos,
            Err(_) => Vec::new(),
        };

        if repos.is_empty() {
            return "**No trending repositories available** ⛔\n".to_string();
        }

        let mut md = String::from("## 🔥 Trending on GitHub\n\n");
        md.push_str("| Repo | Author | Description | Language | Stars | Forks | Link |\n");
        md.push_str("|------|--------|-------------|----------|-------|-------|------|\n");

        for repo in &repos {
            md.push_str(&format!(
                "| {} | {} | {} | {} | ⭐ {} | 🔱 {} | [View]({}) |\n",
                repo.name,
                repo.author,
                truncate(&repo.description, DESCRIPTION_CHARS),
                repo.language,
                repo.stars,
                repo.forks,
                repo.url
            ));
        }

        md
    }
}
