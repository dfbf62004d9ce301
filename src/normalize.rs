//! # Text Normalization
//!
//! One shared cleaning chain for every piece of text that reaches the
//! sentiment scorer — video descriptions and scraped comments alike. Training
//! and serving both call `clean_text`, so the scorer always sees identical
//! input for identical raw text.
//!
//! The chain, in order:
//! 1. lowercase,
//! 2. drop characters outside the word/whitespace classes,
//! 3. drop `@handle` mentions,
//! 4. replace newlines with spaces.
//!
//! The chain is idempotent: running it on its own output is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static RE_HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[A-Za-z0-9]+").expect("valid regex"));

/// Clean one piece of raw text for sentiment scoring.
pub fn clean_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let out = RE_NON_WORD.replace_all(&lowered, "");
    let out = RE_HANDLE.replace_all(&out, "");
    out.replace('\n', " ")
}

/// Absent text is scored as the empty string, never as an error.
pub fn clean_opt_text(raw: Option<&str>) -> String {
    clean_text(raw.unwrap_or_default())
}
