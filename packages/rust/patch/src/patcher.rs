//! Marker-based document patching.
//!
//! [`patch`] splices replacement text into a host document between two
//! sentinel markers. It is a pure function over strings: callers own all
//! file I/O, and a failed patch returns the error without producing output.

use dailybrief_shared::{DailyBriefError, Result};
use tracing::debug;

/// How the replacement text relates to the sentinel markers.
///
/// The two historical call sites differ: the README updater replaces only
/// the interior span and leaves the host's markers untouched, while the
/// workflow updater ships a payload that carries its own marker copies.
/// Mixing the two on one document duplicates markers, so the mode is an
/// explicit argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    /// `replacement` is interior text; the host's markers stay in place.
    Interior,
    /// `replacement` carries exactly one copy of each marker and replaces
    /// the host span including the markers.
    Inclusive,
}

/// Splice `replacement` into `host` between `begin` and `end`.
///
/// When both markers are present, the delimited span is rewritten according
/// to `mode`. When either marker is absent, a freshly delimited
/// `## 📅 Daily Brief` section is appended after the existing content (the
/// bootstrap path, taken once per host file's lifetime).
///
/// Postconditions, enforced before returning: the output contains exactly
/// one of each marker, begin before end, and ends with exactly one trailing
/// newline. Patching twice with identical `replacement` is a no-op after
/// the first application.
pub fn patch(
    host: &str,
    begin: &str,
    end: &str,
    replacement: &str,
    mode: PatchMode,
) -> Result<String> {
    let begin_pos = host.find(begin);
    let end_pos = host.find(end);

    if mode == PatchMode::Inclusive {
        ensure_one_pair(replacement, begin, end, "replacement")?;
    }

    let patched = match (begin_pos, end_pos) {
        (Some(b), Some(e)) => {
            if b >= e {
                return Err(DailyBriefError::malformed(format!(
                    "begin marker at {b} does not precede end marker at {e}"
                )));
            }
            debug!(begin_pos = b, end_pos = e, ?mode, "replacing marked span");
            match mode {
                PatchMode::Interior => {
                    let before = &host[..b + begin.len()];
                    let after = &host[e..];
                    format!("{before}\n{}\n{after}", replacement.trim_matches('\n'))
                }
                PatchMode::Inclusive => {
                    let before = &host[..b];
                    let after = &host[e + end.len()..];
                    format!("{before}{replacement}{after}")
                }
            }
        }
        _ => {
            debug!(?mode, "markers absent, appending bootstrap section");
            let section = match mode {
                PatchMode::Interior => {
                    format!("{begin}\n{}\n{end}", replacement.trim_matches('\n'))
                }
                PatchMode::Inclusive => replacement.trim_matches('\n').to_string(),
            };

            let mut out = String::new();
            let existing = host.trim_end_matches('\n');
            if !existing.is_empty() {
                out.push_str(existing);
                out.push_str("\n\n");
            }
            out.push_str("## 📅 Daily Brief\n\n");
            out.push_str(&section);
            out
        }
    };

    finalize(patched, begin, end)
}

/// Normalize the trailing newline and enforce the marker invariant.
fn finalize(text: String, begin: &str, end: &str) -> Result<String> {
    let text = format!("{}\n", text.trim_end_matches('\n'));
    ensure_one_pair(&text, begin, end, "patched document")?;

    // Counts are exactly one each, so find() positions are authoritative.
    let b = text.find(begin).expect("begin marker present");
    let e = text.find(end).expect("end marker present");
    if b >= e {
        return Err(DailyBriefError::malformed(format!(
            "patched document has begin marker at {b} after end marker at {e}"
        )));
    }

    Ok(text)
}

fn ensure_one_pair(text: &str, begin: &str, end: &str, what: &str) -> Result<()> {
    let begin_count = text.matches(begin).count();
    let end_count = text.matches(end).count();
    if begin_count != 1 || end_count != 1 {
        return Err(DailyBriefError::malformed(format!(
            "{what} must contain exactly one marker pair, found {begin_count} begin / {end_count} end"
        )));
    }
    Ok(())
}
