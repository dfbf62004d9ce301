// src/ingest/mod.rs
//
// Boundary normalization for everything that enters the pipeline: runtime
// codes, archive-flavored boolean flags, HTML entities in scraped text,
// JSON-lines exports, and video ids pasted as full URLs. Records are coerced
// once here; the feature pipeline downstream never revisits raw input.

pub mod providers;
pub mod types;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Convert an ISO-8601-style runtime code (`PT1H2M3S`, `P1DT2H`) to
/// fractional minutes. Returns `None` for anything malformed; the caller
/// decides the default.
///
/// `M` is always read as minutes: YouTube runtimes never carry a month part.
pub fn parse_runtime_minutes(code: &str) -> Option<f64> {
    let s = code.trim();
    let body = s.strip_prefix(['P', 'p'])?;

    let mut minutes = 0.0f64;
    let mut digits = String::new();
    let mut saw_component = false;

    for ch in body.chars() {
        match ch {
            '0'..='9' | '.' => digits.push(ch),
            'T' | 't' => {
                // The date/time separator may not interrupt a number.
                if !digits.is_empty() {
                    return None;
                }
            }
            'D' | 'd' | 'H' | 'h' | 'M' | 'm' | 'S' | 's' => {
                let value: f64 = digits.parse().ok()?;
                digits.clear();
                saw_component = true;
                minutes += match ch.to_ascii_uppercase() {
                    'D' => value * 1440.0,
                    'H' => value * 60.0,
                    'M' => value,
                    _ => value / 60.0,
                };
            }
            _ => return None,
        }
    }

    // A trailing number without its unit letter is malformed.
    if !digits.is_empty() {
        return None;
    }
    saw_component.then_some(minutes)
}

/// Pull the 11-character video id out of user input: a bare id, a full
/// `watch?v=` URL, a `youtu.be` short link, or a shorts link.
pub fn extract_video_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let tail = ["watch?v=", "youtu.be/", "/shorts/"]
        .iter()
        .filter_map(|marker| {
            trimmed
                .rfind(marker)
                .map(|at| &trimmed[at + marker.len()..])
        })
        .next()
        .unwrap_or(trimmed);

    let id: String = tail.chars().take(11).collect();
    let well_formed = id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    well_formed.then_some(id)
}

/// Read one record per line from a JSON-lines export. Blank lines are
/// skipped; a malformed line is an error with its line number.
pub fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading records from {}", path.display()))?;

    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed record", path.display(), idx + 1))?;
        out.push(record);
    }
    Ok(out)
}

/// serde helper: accept `true`/`false`, 0/1, and the `"t"`/`"f"` strings the
/// archive exports use. Unrecognized strings read as false.
pub(crate) fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(n) => n != 0,
        Raw::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "t" | "true" | "1" | "y" | "yes"
        ),
    })
}

/// serde helper: decode HTML entities in scraped text once, at the boundary.
pub(crate) fn decode_entities<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(html_escape::decode_html_entities(&raw).into_owned())
}
