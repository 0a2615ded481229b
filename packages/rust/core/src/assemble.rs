//! Composite document assembly.
//!
//! Builds the unified daily brief from per-agent fragments. Section order
//! is defined by [`ROSTER`] alone, never by completion order, so the
//! same set of fragments always assembles into byte-identical output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use dailybrief_shared::{BEGIN_MARKER, END_MARKER};

/// The fixed agent roster, in presentation order.
pub const ROSTER: &[&str] = &["Quote", "Weather", "Intel", "CyberPulse", "Trending"];

/// Collapsible-section title for each roster entry.
fn section_title(name: &str) -> &'static str {
    match name {
        "Quote" => "💭 Quote of the Day",
        "Weather" => "🌤️ Weather Report",
        "Intel" => "📰 Global Intelligence News",
        "CyberPulse" => "🔐 Cyber Pulse Report",
        "Trending" => "🔥 Trending on GitHub",
        _ => "📄 Report",
    }
}

/// Placeholder fragment substituted when an agent left nothing behind.
pub fn placeholder_fragment(name: &str) -> String {
    match name {
        "Quote" => "**Quote unavailable** ⛔\n".to_string(),
        "Weather" => "**Weather data unavailable** ⛔\n".to_string(),
        "Intel" => "**No news stories available** ⛔\n".to_string(),
        "CyberPulse" => "**No cybersecurity headlines available** ⛔\n".to_string(),
        "Trending" => "**No trending repositories available** ⛔\n".to_string(),
        _ => format!("**{name} data unavailable** ⛔\n"),
    }
}

/// A fragment must stand alone inside the managed region: if an upstream
/// source smuggled sentinel markers into its text, strip them here.
fn sanitize_fragment(name: &str, fragment: &str) -> String {
    if fragment.contains(BEGIN_MARKER) || fragment.contains(END_MARKER) {
        warn!(agent = name, "fragment contained sentinel markers, stripping");
        return fragment.replace(BEGIN_MARKER, "").replace(END_MARKER, "");
    }
    fragment.to_string()
}

/// Assemble the composite daily brief from collected fragments.
///
/// Every roster section is always present; missing fragments render as
/// placeholders. Exactly one generation timestamp appears, in the footer.
pub fn compose(fragments: &HashMap<String, String>, generated_at: DateTime<Utc>) -> String {
    let date_long = generated_at.format("%A, %B %d, %Y");
    let time_str = generated_at.format("%I:%M %p UTC");

    let mut md = String::new();
    md.push_str("<div align=\"center\">\n\n");
    md.push_str("# 📅 Daily Brief\n\n");
    md.push_str(&format!("**{date_long}**\n\n"));
    md.push_str("</div>\n\n");
    md.push_str("---\n\n");

    for name in ROSTER {
        let fragment = fragments
            .get(*name)
            .map(|f| sanitize_fragment(name, f))
            .unwrap_or_else(|| placeholder_fragment(name));

        md.push_str(&format!(
            "<details>\n<summary><b>{}</b></summary>\n\n",
            section_title(name)
        ));
        md.push_str(&fragment);
        md.push_str("\n</details>\n\n");
    }

    md.push_str("---\n\n");
    md.push_str("<div align=\"center\">\n\n");
    md.push_str(&format!("_Generated at {time_str}_\n\n"));
    md.push_str("</div>\n");

    md
}

/// Wrap a composite brief in the collapsible block embedded in the host
/// document's managed region.
pub fn wrap_for_host(brief: &str) -> String {
    format!(
        "<details>\n<summary><b>📰 Today's Intelligence Brief</b></summary>\n\n{brief}\n\n</details>"
    )
}

/// The standalone brief artifact: the wrapped brief carrying its own
/// marker pair, as validated before the host document is touched.
pub fn brief_document(brief: &str) -> String {
    format!(
        "{BEGIN_MARKER}\n{}\n{END_MARKER}\n",
        wrap_for_host(brief)
    )
}

/// Render the dated archive entry: structured preamble plus the brief body.
pub fn archive_entry(brief: &str, generated_at: DateTime<Utc>) -> String {
    let date_iso = generated_at.format("%Y-%m-%d");
    let date_long = generated_at.format("%A, %B %d, %Y");

    format!(
        "---\ndate: {date_iso}\ntitle: \"Daily Brief - {date_long}\"\ngenerated: {}\n---\n\n{brief}",
        generated_at.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated_at() -> DateTime<Utc> {
        "2025-08-07T14:00:00Z".parse().unwrap()
    }

    fn full_fragments() -> HashMap<String, String> {
        ROSTER
            .iter()
            .map(|name| (name.to_string(), format!("content for {name}\n")))
            .collect()
    }

    #[test]
    fn sections_follow_roster_order() {
        let brief = compose(&full_fragments(), generated_at());

        let positions: Vec<usize> = ROSTER
            .iter()
            .map(|name| brief.find(&format!("content for {name}")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn insertion_order_does_not_matter() {
        // Fragments arriving in reverse completion order assemble
        // byte-identically.
        let forward = compose(&full_fragments(), generated_at());

        let mut reversed = HashMap::new();
        for name in ROSTER.iter().rev() {
            reversed.insert(name.to_string(), format!("content for {name}\n"));
        }
        let backward = compose(&reversed, generated_at());

        assert_eq!(forward, backward);
    }

    #[test]
    fn missing_fragments_become_placeholders() {
        let brief = compose(&HashMap::new(), generated_at());

        assert!(brief.contains("**Quote unavailable** ⛔"));
        assert!(brief.contains("**Weather data unavailable** ⛔"));
        assert!(brief.contains("**No news stories available** ⛔"));
        assert!(brief.contains("**No cybersecurity headlines available** ⛔"));
        assert!(brief.contains("**No trending repositories available** ⛔"));
        // All five sections still present.
        assert_eq!(brief.matches("<details>").count(), 5);
    }

    #[test]
    fn exactly_one_generation_timestamp() {
        let brief = compose(&full_fragments(), generated_at());
        assert_eq!(brief.matches("_Generated at").count(), 1);
        assert!(brief.contains("_Generated at 02:00 PM UTC_"));
        assert!(brief.contains("**Thursday, August 07, 2025**"));
    }

    #[test]
    fn fragments_cannot_smuggle_markers() {
        let mut fragments = full_fragments();
        fragments.insert(
            "Quote".to_string(),
            format!("evil\n{BEGIN_MARKER}\nstill evil\n{END_MARKER}\n"),
        );

        let brief = compose(&fragments, generated_at());
        assert!(!brief.contains(BEGIN_MARKER));
        assert!(!brief.contains(END_MARKER));
        assert!(brief.contains("still evil"));
    }

    #[test]
    fn brief_document_carries_one_marker_pair() {
        let doc = brief_document(&compose(&full_fragments(), generated_at()));
        assert!(doc.starts_with(BEGIN_MARKER));
        assert!(doc.ends_with(&format!("{END_MARKER}\n")));
        assert_eq!(doc.matches(BEGIN_MARKER).count(), 1);
        assert_eq!(doc.matches(END_MARKER).count(), 1);
        assert!(doc.contains("📰 Today's Intelligence Brief"));
    }

    #[test]
    fn archive_entry_has_structured_preamble() {
        let entry = archive_entry("BODY\n", generated_at());
        assert!(entry.starts_with("---\ndate: 2025-08-07\n"));
        assert!(entry.contains("title: \"Daily Brief - Thursday, August 07, 2025\""));
        assert!(entry.contains("generated: 2025-08-07T14:00:00+00:00"));
        assert!(entry.ends_with("BODY\n"));
    }
}
