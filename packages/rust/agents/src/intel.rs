//! Global intelligence agent — world-news headlines from RSS feeds.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use dailybrief_feed::{extract_items, truncate};
use dailybrief_shared::{FeedSource, Result};

use crate::{Agent, http_client};

/// Items pulled from each feed before merging.
const ITEMS_PER_FEED: usize = 10;

/// Cleaned description length cap.
const DESCRIPTION_CHARS: usize = 300;

/// One news story in the semantic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    pub source: String,
    pub published: DateTime<Utc>,
}

/// Agent fetching global intelligence news.
pub struct IntelAgent {
    client: Client,
    feeds: Vec<FeedSource>,
    max_stories: usize,
}

impl IntelAgent {
    pub fn new(feeds: Vec<FeedSource>, max_stories: usize, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            feeds,
            max_stories,
        })
    }

    async fn fetch_feed(&self, feed: &FeedSource, fallback_date: DateTime<Utc>) -> Vec<StoryRecord> {
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

        extract_items(&xml, &feed.name, ITEMS_PER_FEED)
            .into_iter()
            .map(|item| StoryRecord {
                title: item.title,
                link: item.link,
                description: truncate(&item.description, DESCRIPTION_CHARS),
                source: item.source,
                published: item.published.unwrap_or(fallback_date),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Agent for IntelAgent {
    fn name(&self) -> &'static str {
        "Intel"
    }

    async fn fetch(&self) -> Result<Option<Value>> {
        let fallback_date = Utc::now();
        let mut stories = Vec::new();

        for feed in &self.feeds {
            let fetched = self.fetch_feed(feed, fallback_date).await;
            if !fetched.is_empty() {
                info!(feed = %feed.name, count = fetched.len(), "fetched stories");
                stories.extend(fetched);
            }
        }

        if stories.is_empty() {
            return Ok(None);
        }

        // Most recent first, then the top slice.
        stories.sort_by(|a, b| b.published.cmp(&a.published));
        stories.truncate(self.max_stories);

        Ok(Some(serde_json::to_value(stories).expect("record serializes")))
    }

    fn render(&self, data: &Value) -> String {
        let stories: Vec<StoryRecord> = match serde_json::from_value(data.clone()) {
            Ok(stories) => stories,
            Err(_) => Vec::new(),
        };

        if stories.is_empty() {
            return "**No news stories available** ⛔\n".to_string();
        }

        let mut md = String::from("## 📰 Global Intelligence Report\n\n");

        let count = stories.len();
        for (i, story) in stories.iter().enumerate() {
            md.push_str(&format!(
                "### {}. [{}]({})\n\n",
                i + 1,
                story.title,
                story.link
            ));
            md.push_str(&format!("**Source:** {}\n\n", story.source));
            md.push_str(&format!("{}\n\n", sentence_digest(&story.description)));
            md.push_str(&format!(
                "*Published: {}*\n\n",
                story.published.format("%B %d, %Y at %H:%M UTC")
            ));

            if i + 1 < count {
                md.push_str("---\n\n");
            }
        }

        md
    }
}

/// First few sentences of a description, elided when there's more.
fn sentence_digest(description: &str) -> String {
    let sentences: Vec<&str> = description.split(". ").collect();
    let mut digest = sentences
        .iter()
        .take(3)
        .copied()
        .collect::<Vec<_>>()
        .join(". ");
    if digest.len() < description.len() {
        digest.push_str("...");
    }
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(name: &str, url: &str) -> FeedSource {
        FeedSource {
            name: name.into(),
            url: Url::parse(url).unwrap(),
            favicon: None,
        }
    }

    fn rss(items: &[(&str, &str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(title, link, date)| {
                format!(
                    "<item><title>{title}</title><link>{link}</link>\
                     <description>Desc for {title}. More text here. And more. Even more.</description>\
                     <pubDate>{date}</pubDate></item>"
                )
            })
            .collect();
        format!("<rss><channel>{body}</channel></rss>")
    }

    #[tokio::test]
    async fn merges_and_sorts_across_feeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
                ("Old story", "https://a.example/1", "Mon, 04 Aug 2025 08:00:00 GMT"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
                ("Fresh story", "https://b.example/1", "Wed, 06 Aug 2025 08:00:00 GMT"),
            ])))
            .mount(&server)
            .await;

        let agent = IntelAgent::new(
            vec![
                source("Feed A", &format!("{}/a", server.uri())),
                source("Feed B", &format!("{}/b", server.uri())),
            ],
            3,
            5,
        )
        .unwrap();

        let data = agent.fetch().await.unwrap().unwrap();
        let stories: Vec<StoryRecord> = serde_json::from_value(data).unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title, "Fresh story");
        assert_eq!(stories[1].title, "Old story");
    }

    #[tokio::test]
    async fn one_dead_feed_does_not_sink_the_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dead"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/live"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
                ("Survivor", "https://l.example/1", "Wed, 06 Aug 2025 08:00:00 GMT"),
            ])))
            .mount(&server)
            .await;

        let agent = IntelAgent::new(
            vec![
                source("Dead", &format!("{}/dead", server.uri())),
                source("Live", &format!("{}/live", server.uri())),
            ],
            3,
            5,
        )
        .unwrap();

        let data = agent.fetch().await.unwrap().unwrap();
        let stories: Vec<StoryRecord> = serde_json::from_value(data).unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].source, "Live");
    }

    #[tokio::test]
    async fn all_feeds_dead_means_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let agent = IntelAgent::new(vec![source("Dead", &server.uri())], 3, 5).unwrap();
        assert!(agent.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn respects_max_stories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
                ("S1", "https://e.com/1", "Wed, 06 Aug 2025 10:00:00 GMT"),
                ("S2", "https://e.com/2", "Wed, 06 Aug 2025 09:00:00 GMT"),
                ("S3", "https://e.com/3", "Wed, 06 Aug 2025 08:00:00 GMT"),
                ("S4", "https://e.com/4", "Wed, 06 Aug 2025 07:00:00 GMT"),
            ])))
            .mount(&server)
            .await;

        let agent = IntelAgent::new(vec![source("Wire", &server.uri())], 3, 5).unwrap();
        let data = agent.fetch().await.unwrap().unwrap();
        let stories: Vec<StoryRecord> = serde_json::from_value(data).unwrap();
        assert_eq!(stories.len(), 3);
        assert_eq!(stories[0].title, "S1");
    }

    #[test]
    fn renders_numbered_stories_with_separators() {
        let agent = IntelAgent::new(vec![], 3, 5).unwrap();
        let stories = vec![
            StoryRecord {
                title: "First".into(),
                link: "https://e.com/1".into(),
                description: "Alpha. Beta. Gamma. Delta. Epsilon.".into(),
                source: "Wire".into(),
                published: "2025-08-06T09:30:00Z".parse().unwrap(),
            },
            StoryRecord {
                title: "Second".into(),
                link: "https://e.com/2".into(),
                description: "Short.".into(),
                source: "Wire".into(),
                published: "2025-08-06T08:00:00Z".parse().unwrap(),
            },
        ];

        let md = agent.render(&serde_json::to_value(stories).unwrap());
        assert!(md.starts_with("## 📰 Global Intelligence Report"));
        assert!(md.contains("### 1. [First](https://e.com/1)"));
        assert!(md.contains("### 2. [Second](https://e.com/2)"));
        assert!(md.contains("*Published: August 06, 2025 at 09:30 UTC*"));
        // Digest elided after three sentences; separator only between stories.
        assert!(md.contains("Alpha. Beta. Gamma..."));
        assert_eq!(md.matches("---").count(), 1);
    }

    #[test]
    fn renders_placeholder_for_empty_record() {
        let agent = IntelAgent::new(vec![], 3, 5).unwrap();
        let md = agent.render(&serde_json::json!([]));
        assert_eq!(md, "**No news stories available** ⛔\n");
    }
}
