//! Structural validation for candidate brief documents.
//!
//! A fixed, ordered sequence of checks runs against the document text,
//! short-circuiting on the first failure. Each check carries its own
//! diagnostic so a CI log pinpoints what broke. Pure functions, no I/O.

use dailybrief_shared::{BEGIN_MARKER, DailyBriefError, END_MARKER};

/// Minimum number of non-blank lines a real brief produces.
pub const MIN_CONTENT_LINES: usize = 10;

/// The individual structural checks, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefCheck {
    /// Document is non-empty after trimming whitespace.
    NonEmpty,
    /// Contains a collapsible `<details>` section.
    CollapsibleSection,
    /// Contains the date-header token.
    DateHeader,
    /// Has at least [`MIN_CONTENT_LINES`] non-blank lines.
    MinimumContent,
    /// Contains the BEGIN sentinel marker.
    BeginMarker,
    /// Contains the END sentinel marker.
    EndMarker,
    /// Collapsible-section tags are literal, not HTML-escaped.
    LiteralMarkup,
    /// BEGIN marker strictly precedes END marker.
    MarkerOrder,
}

/// A failed check plus its human-readable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub check: BriefCheck,
    pub message: String,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ValidationFailure> for DailyBriefError {
    fn from(failure: ValidationFailure) -> Self {
        DailyBriefError::validation(failure.message)
    }
}

fn fail(check: BriefCheck, message: impl Into<String>) -> Result<(), ValidationFailure> {
    Err(ValidationFailure {
        check,
        message: message.into(),
    })
}

/// Run all structural checks against a candidate brief document.
///
/// Checks run in a fixed order and stop at the first failure; the overall
/// verdict is the conjunction of all of them.
pub fn validate(text: &str) -> Result<(), ValidationFailure> {
    if text.trim().is_empty() {
        return fail(BriefCheck::NonEmpty, "brief document is empty");
    }

    if !text.contains("<details>") {
        return fail(
            BriefCheck::CollapsibleSection,
            "missing <details> block",
        );
    }

    if !text.contains("📅 Daily Brief") {
        return fail(
            BriefCheck::DateHeader,
            "missing date header (📅 Daily Brief)",
        );
    }

    let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
    if non_blank < MIN_CONTENT_LINES {
        return fail(
            BriefCheck::MinimumContent,
            format!(
                "insufficient content: {non_blank} non-blank lines, need at least {MIN_CONTENT_LINES}"
            ),
        );
    }

    if !text.contains(BEGIN_MARKER) {
        return fail(
            BriefCheck::BeginMarker,
            format!("missing {BEGIN_MARKER} marker"),
        );
    }

    if !text.contains(END_MARKER) {
        return fail(
            BriefCheck::EndMarker,
            format!("missing {END_MARKER} marker"),
        );
    }

    // Detects the double-encoding corruption mode where markup arrives as
    // &lt;details&gt; and GitHub renders it as literal text.
    if text.contains("&lt;details&gt;") || text.contains("&lt;summary&gt;") {
        return fail(
            BriefCheck::LiteralMarkup,
            "HTML tags are escaped (found &lt;details&gt; or &lt;summary&gt;)",
        );
    }

    let begin_pos = text.find(BEGIN_MARKER).expect("begin marker present");
    let end_pos = text.find(END_MARKER).expect("end marker present");
    if begin_pos >= end_pos {
        return fail(
            BriefCheck::MarkerOrder,
            "markers are in wrong order or overlapping",
        );
    }

    Ok(())
}

/// Boolean convenience wrapper over [`validate`].
pub fn is_valid(text: &str) -> bool {
    validate(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_brief() -> String {
        format!(
            "{BEGIN_MARKER}\n\
             <details>\n\
             <summary><b>📰 Today's Intelligence Brief</b></summary>\n\n\
             <div align=\"center\">\n\n\
             # 📅 Daily Brief\n\n\
             **Thursday, August 7, 2025**\n\n\
             </div>\n\n\
             ---\n\n\
             <details>\n\
             <summary><b>💭 Quote of the Day</b></summary>\n\n\
             > \"First, solve the problem. Then, write the code.\"\n\
             >\n\
             > — **John Johnson**\n\n\
             </details>\n\n\
             ---\n\n\
             _Generated at 10:00 AM UTC_\n\n\
             </details>\n\
             {END_MARKER}\n"
        )
    }

    #[test]
    fn accepts_well_formed_brief() {
        assert_eq!(validate(&valid_brief()), Ok(()));
        assert!(is_valid(&valid_brief()));
    }

    #[test]
    fn rejects_empty_document() {
        let failure = validate("   \n\n  ").unwrap_err();
        assert_eq!(failure.check, BriefCheck::NonEmpty);
    }

    #[test]
    fn rejects_missing_details_block() {
        let doc = valid_brief().replace("<details>", "(section)");
        let failure = validate(&doc).unwrap_err();
        assert_eq!(failure.check, BriefCheck::CollapsibleSection);
    }

    #[test]
    fn rejects_missing_date_header() {
        let doc = valid_brief().replace("📅 Daily Brief", "Untitled");
        let failure = validate(&doc).unwrap_err();
        assert_eq!(failure.check, BriefCheck::DateHeader);
    }

    #[test]
    fn rejects_thin_content() {
        let doc = format!(
            "{BEGIN_MARKER}\n<details>\n📅 Daily Brief\n</details>\n{END_MARKER}\n"
        );
        let failure = validate(&doc).unwrap_err();
        assert_eq!(failure.check, BriefCheck::MinimumContent);
        assert!(failure.message.contains("need at least 10"));
    }

    #[test]
    fn missing_end_marker_is_identified() {
        // Every other check passes; the diagnostic must name the END marker.
        let doc = valid_brief().replace(END_MARKER, "");
        let failure = validate(&doc).unwrap_err();
        assert_eq!(failure.check, BriefCheck::EndMarker);
        assert!(failure.message.contains(END_MARKER));
    }

    #[test]
    fn missing_begin_marker_is_identified() {
        let doc = valid_brief().replace(BEGIN_MARKER, "");
        let failure = validate(&doc).unwrap_err();
        assert_eq!(failure.check, BriefCheck::BeginMarker);
        assert!(failure.message.contains(BEGIN_MARKER));
    }

    #[test]
    fn rejects_escaped_markup() {
        // Escaped tags alongside literal ones still fail: the escaped form
        // is the corruption signal even when every other check passes.
        let doc = valid_brief().replace(
            "_Generated at 10:00 AM UTC_",
            "&lt;details&gt;leftover&lt;/details&gt;\n_Generated at 10:00 AM UTC_",
        );
        let failure = validate(&doc).unwrap_err();
        assert_eq!(failure.check, BriefCheck::LiteralMarkup);
    }

    #[test]
    fn rejects_reversed_markers() {
        let doc = valid_brief();
        let swapped = doc
            .replacen(BEGIN_MARKER, "\u{0}PLACEHOLDER\u{0}", 1)
            .replacen(END_MARKER, BEGIN_MARKER, 1)
            .replacen("\u{0}PLACEHOLDER\u{0}", END_MARKER, 1);
        let failure = validate(&swapped).unwrap_err();
        assert_eq!(failure.check, BriefCheck::MarkerOrder);
    }

    #[test]
    fn failure_converts_to_shared_error() {
        let failure = validate("").unwrap_err();
        let err: DailyBriefError = failure.into();
        assert!(err.to_string().contains("empty"));
    }
}
