//! Lightweight RSS/Atom field extraction for news-style feeds.
//!
//! Feeds in the wild are messy enough that a strict XML parse rejects
//! content we could still use, so extraction is regex-based over `<item>`
//! (RSS 2.0) and `<entry>` (Atom) blocks, CDATA-aware. Each pass is a pure
//! function; no I/O happens here.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

/// One extracted feed entry.
#[derive(Debug, Clone)]
pub struct FeedItem {
    /// Headline text.
    pub title: String,
    /// Article URL.
    pub link: String,
    /// Cleaned plain-text description.
    pub description: String,
    /// Source name for attribution.
    pub source: String,
    /// Publish timestamp; `None` when the feed omitted or mangled it.
    pub published: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Block extraction
// ---------------------------------------------------------------------------

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item[\s>].*?</item>").expect("valid regex"));

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry[\s>].*?</entry>").expect("valid regex"));

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<title[^>]*>(?:\s*<!\[CDATA\[(.*?)\]\]>\s*|(.*?))</title>")
        .expect("valid regex")
});

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<link>(.*?)</link>").expect("valid regex"));

static ATOM_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<link[^>]*\bhref="([^"]+)""#).expect("valid regex"));

static DESC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<description[^>]*>(?:\s*<!\[CDATA\[(.*?)\]\]>\s*|(.*?))</description>")
        .expect("valid regex")
});

static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<summary[^>]*>(?:\s*<!\[CDATA\[(.*?)\]\]>\s*|(.*?))</summary>")
        .expect("valid regex")
});

static PUB_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pubDate>(.*?)</pubDate>").expect("valid regex"));

static UPDATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<updated>(.*?)</updated>").expect("valid regex"));

/// Extract up to `limit` entries from an RSS 2.0 or Atom document.
///
/// Items missing a title or link are dropped; everything else degrades
/// field-by-field (missing descriptions become a stock line, unparseable
/// dates become `None`).
pub fn extract_items(xml: &str, source: &str, limit: usize) -> Vec<FeedItem> {
    let mut items = Vec::new();

    let blocks: Vec<&str> = ITEM_RE
        .find_iter(xml)
        .chain(ENTRY_RE.find_iter(xml))
        .map(|m| m.as_str())
        .take(limit)
        .collect();

    for block in blocks {
        if let Some(item) = extract_one(block, source) {
            items.push(item);
        }
    }

    debug!(source, count = items.len(), "feed extraction complete");
    items
}

fn extract_one(block: &str, source: &str) -> Option<FeedItem> {
    let title = capture_text(&TITLE_RE, block)?;
    let link = capture_text(&LINK_RE, block)
        .or_else(|| ATOM_LINK_RE.captures(block).map(|c| c[1].trim().to_string()))?;

    if title.is_empty() || link.is_empty() {
        return None;
    }

    let description = capture_text(&DESC_RE, block)
        .or_else(|| capture_text(&SUMMARY_RE, block))
        .map(|d| strip_html(&d))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "No description available".to_string());

    let published = PUB_DATE_RE
        .captures(block)
        .or_else(|| UPDATED_RE.captures(block))
        .and_then(|c| parse_feed_date(c[1].trim()));

    Some(FeedItem {
        title: strip_html(&title),
        link,
        description,
        source: source.to_string(),
        published,
    })
}

/// Pull the first capture group that matched (CDATA body or plain body).
fn capture_text(re: &Regex, haystack: &str) -> Option<String> {
    let caps = re.captures(haystack)?;
    let text = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())?;
    Some(text)
}

// ---------------------------------------------------------------------------
// Cleanup passes
// ---------------------------------------------------------------------------

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!\[CDATA\[|\]\]>").expect("valid regex"));

/// Strip HTML tags and CDATA markers, collapse whitespace runs.
pub fn strip_html(text: &str) -> String {
    let text = CDATA_RE.replace_all(text, "");
    let text = TAG_RE.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse a feed timestamp — RFC 2822 (RSS `pubDate`) first, then RFC 3339
/// (Atom `updated`). Returns `None` for anything else; callers substitute
/// the run timestamp.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example Wire</title>
    <item>
      <title><![CDATA[First headline]]></title>
      <link>https://news.example.com/1</link>
      <description><![CDATA[<p>Body with <b>markup</b> inside.</p>]]></description>
      <pubDate>Tue, 05 Aug 2025 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Second headline</title>
      <link>https://news.example.com/2</link>
      <description>Plain description</description>
      <pubDate>not a date</pubDate>
    </item>
    <item>
      <title>No link, dropped</title>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Atom headline</title>
    <link href="https://blog.example.com/post"/>
    <summary>Atom summary text</summary>
    <updated>2025-08-05T12:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn extracts_rss_items() {
        let items = extract_items(RSS_SAMPLE, "Example Wire", 10);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "First headline");
        assert_eq!(items[0].link, "https://news.example.com/1");
        assert_eq!(items[0].description, "Body with markup inside.");
        assert_eq!(items[0].source, "Example Wire");
        assert!(items[0].published.is_some());

        // Unparseable date degrades to None, item survives.
        assert_eq!(items[1].title, "Second headline");
        assert!(items[1].published.is_none());
    }

    #[test]
    fn extracts_atom_entries() {
        let items = extract_items(ATOM_SAMPLE, "Example Blog", 10);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Atom headline");
        assert_eq!(items[0].link, "https://blog.example.com/post");
        assert_eq!(items[0].description, "Atom summary text");
        assert!(items[0].published.is_some());
    }

    #[test]
    fn respects_limit() {
        let items = extract_items(RSS_SAMPLE, "Example Wire", 1);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn missing_description_gets_stock_line() {
        let xml = r#"<item><title>T</title><link>https://e.com/x</link></item>"#;
        let items = extract_items(xml, "S", 5);
        assert_eq!(items[0].description, "No description available");
    }

    #[test]
    fn strip_html_removes_tags_and_collapses_whitespace() {
        let input = "<p>Hello  <b>world</b></p>\n\n  <a href=\"x\">link</a>";
        assert_eq!(strip_html(input), "Hello world link");
    }

    #[test]
    fn strip_html_removes_comment_markers() {
        // A hostile feed cannot smuggle sentinel comments through cleanup.
        let input = "before <!-- BEGIN DAILY BRIEF --> after";
        assert_eq!(strip_html(input), "before after");
    }

    #[test]
    fn truncate_is_char_boundary_safe() {
        let s = "áéíóú".repeat(20);
        let cut = truncate(&s, 10);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= 10);

        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn parses_rfc2822_and_rfc3339_dates() {
        assert!(parse_feed_date("Tue, 05 Aug 2025 09:30:00 +0000").is_some());
        assert!(parse_feed_date("Tue, 05 Aug 2025 09:30:00 GMT").is_some());
        assert!(parse_feed_date("2025-08-05T09:30:00Z").is_some());
        assert!(parse_feed_date("yesterday-ish").is_none());
    }
}
