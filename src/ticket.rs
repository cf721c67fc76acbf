// src/ticket.rs
//! Ticket shape at the helpdesk boundary, text normalization, and the
//! anonymized hash used whenever ticket text shows up in logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A support ticket as seen by the analysis pipeline.
///
/// Read-mostly: the pipeline never creates or deletes tickets, it only
/// proposes an updated tag set. `full_text` (subject + description + public
/// comment bodies) is preferred for analysis when the fetch layer supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Concatenated subject + description + public comment bodies, if the
    /// detail fetch ran. Used preferentially for analysis.
    #[serde(default)]
    pub full_text: Option<String>,
}

impl Ticket {
    /// Text handed to the analyzer: `full_text` when present and non-empty,
    /// otherwise subject + description.
    pub fn analysis_text(&self) -> String {
        match &self.full_text {
            Some(t) if !t.trim().is_empty() => t.clone(),
            _ => format!("{}\n{}", self.subject, self.description),
        }
    }

    /// Membership test on the existing tag set (set semantics, order irrelevant).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Normalize helpdesk text: decode HTML entities, strip tags, collapse
/// whitespace, trim. Comment bodies arrive as HTML fragments.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Short anonymized id for log lines. Never log raw ticket text.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
