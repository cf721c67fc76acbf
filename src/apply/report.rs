//! Textual report over a `BatchResult` — a pure projection, no side effects.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::{ApplyStatus, BatchResult};

/// Render totals, a tag-frequency histogram (top `top_n`), and the first
/// `top_n` error reasons.
pub fn render_report(result: &BatchResult, top_n: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Batch tagging report ===");
    let _ = writeln!(
        out,
        "processed: {}  tagged: {}  skipped: {}  errors: {}  success rate: {:.0}%",
        result.processed,
        result.tagged,
        result.skipped,
        result.errors,
        result.success_rate() * 100.0
    );

    let histogram = tag_histogram(result);
    if !histogram.is_empty() {
        let _ = writeln!(out, "--- top tags ---");
        for (tag, count) in histogram.into_iter().take(top_n) {
            let _ = writeln!(out, "{count:>5}  {tag}");
        }
    }

    let errors: Vec<&str> = result
        .outcomes
        .iter()
        .filter(|o| o.status == ApplyStatus::Error)
        .map(|o| o.reason.as_str())
        .take(top_n)
        .collect();
    if !errors.is_empty() {
        let _ = writeln!(out, "--- first errors ---");
        for reason in errors {
            let _ = writeln!(out, "  {reason}");
        }
    }

    out
}

/// Applied-tag frequencies sorted by count descending, then tag name for a
/// deterministic report.
pub fn tag_histogram(result: &BatchResult) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for outcome in &result.outcomes {
        for tag in &outcome.applied_tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
