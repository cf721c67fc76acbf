// src/apply/mod.rs
//! Batch tag applier: turns an `Analysis` plus a ticket's existing tags into
//! an idempotent, rate-limited, partially-failable set of remote updates.
//!
//! The pure per-ticket decision (`plan_apply`) is separated from the
//! side-effecting write so each can be unit-tested without network mocks.
//! The batch loop is deliberately sequential with a fixed inter-item delay to
//! respect the remote rate limit; per-item failures become structured
//! outcomes and never abort the batch.

pub mod report;

use anyhow::Result;
use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::analysis::Analysis;
use crate::tags::dedup_preserve_order;
use crate::ticket::Ticket;

pub const ENV_MIN_CONFIDENCE: &str = "TAGGER_MIN_CONFIDENCE";
pub const ENV_DRY_RUN: &str = "TAGGER_DRY_RUN";
pub const ENV_APPLY_DELAY_MS: &str = "TAGGER_APPLY_DELAY_MS";

/// The single outbound side effect of the core: "make ticket T's tag set S".
/// The implementation owns HTTP, auth, and retry; it may fail per call and is
/// expected to succeed idempotently on retry.
#[async_trait]
pub trait TagWriter: Send + Sync {
    async fn update_tags(&self, ticket_id: u64, tags: &[String]) -> Result<()>;
}

/// Applier configuration. Defaults are conservative: dry-run on, high bar.
#[derive(Debug, Clone)]
pub struct TaggingConfig {
    /// Minimum overall confidence to touch a ticket; `>=` applies, `<` skips.
    pub min_confidence: f32,
    /// When set, run the full decision but suppress the remote write.
    pub dry_run: bool,
    /// Pause after each remote write, for rate-limit compliance.
    pub apply_delay: Duration,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            dry_run: true,
            apply_delay: Duration::from_millis(1000),
        }
    }
}

impl TaggingConfig {
    /// Environment overrides on top of the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = std::env::var(ENV_MIN_CONFIDENCE)
            .ok()
            .and_then(|s| s.trim().parse::<f32>().ok())
        {
            cfg.min_confidence = v.clamp(0.0, 1.0);
        }
        if let Ok(v) = std::env::var(ENV_DRY_RUN) {
            cfg.dry_run = matches!(v.trim(), "1" | "true" | "yes");
        }
        if let Some(ms) = std::env::var(ENV_APPLY_DELAY_MS)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            cfg.apply_delay = Duration::from_millis(ms);
        }
        cfg
    }
}

/// Terminal status of one ticket's tagging. No retry-in-place: retries, where
/// they exist, belong to the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Skipped,
    DryRun,
    Success,
    Error,
}

/// Per-ticket outcome, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketOutcome {
    pub ticket_id: u64,
    pub status: ApplyStatus,
    pub confidence: f32,
    /// Tags applied (or, for dry-run, that would have been applied).
    pub applied_tags: Vec<String>,
    pub reason: String,
}

/// Per-run aggregate; the sole input to reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub processed: usize,
    pub tagged: usize,
    pub skipped: usize,
    pub errors: usize,
    pub outcomes: Vec<TicketOutcome>,
}

impl BatchResult {
    fn push(&mut self, outcome: TicketOutcome) {
        self.processed += 1;
        match outcome.status {
            ApplyStatus::Success | ApplyStatus::DryRun => self.tagged += 1,
            ApplyStatus::Skipped => self.skipped += 1,
            ApplyStatus::Error => self.errors += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Fraction of processed tickets that did not end in error.
    pub fn success_rate(&self) -> f32 {
        if self.processed == 0 {
            return 1.0;
        }
        (self.processed - self.errors) as f32 / self.processed as f32
    }
}

/// Pure per-ticket decision: the apply sequence up to (not including) the write.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyPlan {
    SkipLowConfidence { confidence: f32, threshold: f32 },
    SkipNoNewTags,
    Apply {
        /// Generated tags not already on the ticket.
        tags_to_apply: Vec<String>,
        /// Union of existing tags and `tags_to_apply`, deduplicated.
        new_tag_set: Vec<String>,
    },
}

/// Decide what to do for one ticket. Never touches the network.
pub fn plan_apply(
    existing_tags: &[String],
    analysis: &Analysis,
    config: &TaggingConfig,
) -> ApplyPlan {
    // `<` skips, `>=` applies: a ticket exactly at the threshold is applied.
    if analysis.overall_confidence < config.min_confidence {
        return ApplyPlan::SkipLowConfidence {
            confidence: analysis.overall_confidence,
            threshold: config.min_confidence,
        };
    }

    // Do not re-propose tags already present (set difference).
    let tags_to_apply: Vec<String> = dedup_preserve_order(analysis.tags.clone())
        .into_iter()
        .filter(|t| !existing_tags.contains(t))
        .collect();
    if tags_to_apply.is_empty() {
        return ApplyPlan::SkipNoNewTags;
    }

    let mut new_tag_set = existing_tags.to_vec();
    new_tag_set.extend(tags_to_apply.iter().cloned());
    let new_tag_set = dedup_preserve_order(new_tag_set);

    ApplyPlan::Apply {
        tags_to_apply,
        new_tag_set,
    }
}

/// Execute the decision for one ticket. Returns a terminal outcome; write
/// failures are captured, not re-raised.
pub async fn apply_one(
    ticket: &Ticket,
    analysis: &Analysis,
    config: &TaggingConfig,
    writer: &dyn TagWriter,
) -> TicketOutcome {
    let confidence = analysis.overall_confidence;
    match plan_apply(&ticket.tags, analysis, config) {
        ApplyPlan::SkipLowConfidence {
            confidence,
            threshold,
        } => TicketOutcome {
            ticket_id: ticket.id,
            status: ApplyStatus::Skipped,
            confidence,
            applied_tags: Vec::new(),
            reason: format!("confidence {confidence:.2} below threshold {threshold:.2}"),
        },
        ApplyPlan::SkipNoNewTags => TicketOutcome {
            ticket_id: ticket.id,
            status: ApplyStatus::Skipped,
            confidence,
            applied_tags: Vec::new(),
            reason: "no new tags".to_string(),
        },
        ApplyPlan::Apply {
            tags_to_apply,
            new_tag_set,
        } => {
            if config.dry_run {
                return TicketOutcome {
                    ticket_id: ticket.id,
                    status: ApplyStatus::DryRun,
                    confidence,
                    reason: format!("dry-run: would apply {} tag(s)", tags_to_apply.len()),
                    applied_tags: tags_to_apply,
                };
            }
            match writer.update_tags(ticket.id, &new_tag_set).await {
                Ok(()) => TicketOutcome {
                    ticket_id: ticket.id,
                    status: ApplyStatus::Success,
                    confidence,
                    reason: format!("applied {} tag(s)", tags_to_apply.len()),
                    applied_tags: tags_to_apply,
                },
                Err(e) => TicketOutcome {
                    ticket_id: ticket.id,
                    status: ApplyStatus::Error,
                    confidence,
                    applied_tags: Vec::new(),
                    reason: format!("tag update failed: {e:#}"),
                },
            }
        }
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("tickets_analyzed_total", "Tickets run through the analyzer.");
        describe_counter!("tags_applied_total", "Tags written (or dry-run proposed).");
        describe_counter!("apply_skipped_total", "Tickets skipped by the applier.");
        describe_counter!("apply_errors_total", "Per-ticket apply errors.");
        describe_gauge!("batch_last_run_ts", "Unix ts when the last batch ran.");
    });
}

/// Apply analyses against their tickets sequentially. A missing ticket for an
/// analysis counts as an error; one item's error never blocks later items.
pub async fn batch_apply(
    analyses: &[Analysis],
    tickets: &HashMap<u64, Ticket>,
    config: &TaggingConfig,
    writer: &dyn TagWriter,
) -> BatchResult {
    ensure_metrics_described();

    let mut result = BatchResult::default();
    for (i, analysis) in analyses.iter().enumerate() {
        let (outcome, wrote) = match tickets.get(&analysis.ticket_id) {
            Some(ticket) => {
                let outcome = apply_one(ticket, analysis, config, writer).await;
                // Only Success/Error out of apply_one reached the remote.
                let wrote = !config.dry_run
                    && matches!(outcome.status, ApplyStatus::Success | ApplyStatus::Error);
                (outcome, wrote)
            }
            // Lookup miss: an error outcome, but no remote call was issued.
            None => (
                TicketOutcome {
                    ticket_id: analysis.ticket_id,
                    status: ApplyStatus::Error,
                    confidence: analysis.overall_confidence,
                    applied_tags: Vec::new(),
                    reason: "no ticket found for analysis".to_string(),
                },
                false,
            ),
        };

        match outcome.status {
            ApplyStatus::Success | ApplyStatus::DryRun => {
                counter!("tags_applied_total").increment(outcome.applied_tags.len() as u64);
                debug!(
                    ticket_id = outcome.ticket_id,
                    tags = ?outcome.applied_tags,
                    dry_run = config.dry_run,
                    "tags applied"
                );
            }
            ApplyStatus::Skipped => {
                counter!("apply_skipped_total").increment(1);
                debug!(ticket_id = outcome.ticket_id, reason = %outcome.reason, "skipped");
            }
            ApplyStatus::Error => {
                counter!("apply_errors_total").increment(1);
                warn!(ticket_id = outcome.ticket_id, reason = %outcome.reason, "apply error");
            }
        }

        // Pause after each remote write for the rate-limit contract; skips,
        // dry-runs, and lookup misses issue no call, so no delay is owed.
        result.push(outcome);
        if wrote && i + 1 < analyses.len() && !config.apply_delay.is_zero() {
            tokio::time::sleep(config.apply_delay).await;
        }
    }
    result
}
