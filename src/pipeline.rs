// src/pipeline.rs
//! Orchestrator: fetch → analyze → apply → report.
//!
//! Thin by design. The only fatal failure class is the initial fetch; once
//! per-ticket processing starts, every failure is converted into a structured
//! outcome and the batch runs to completion.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, gauge};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::analysis::Analysis;
use crate::analyze::Analyzer;
use crate::apply::{batch_apply, BatchResult, TagWriter, TaggingConfig};
use crate::ticket::{anon_hash, Ticket};

/// Supplier of the input stream: fresh, not-yet-processed tickets with their
/// analysis text already assembled by the detail fetch.
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn fetch_new_tickets(&self) -> Result<Vec<Ticket>>;
}

/// Run one full batch. A fetch failure propagates (no `BatchResult` at all);
/// everything after that is per-ticket and non-fatal.
pub async fn run_batch(
    source: &dyn TicketSource,
    writer: &dyn TagWriter,
    analyzer: &Analyzer,
    config: &TaggingConfig,
) -> Result<BatchResult> {
    let tickets = source
        .fetch_new_tickets()
        .await
        .context("fetching new tickets")?;
    info!(count = tickets.len(), dry_run = config.dry_run, "batch start");

    let mut analyses: Vec<Analysis> = Vec::with_capacity(tickets.len());
    let mut by_id: HashMap<u64, Ticket> = HashMap::with_capacity(tickets.len());
    for ticket in tickets {
        let text = ticket.analysis_text();
        // Degraded guard: unusable text still yields a marked analysis so the
        // batch never aborts because one ticket is malformed.
        let analysis = if text.trim().is_empty() {
            debug!(ticket_id = ticket.id, "empty analysis text, degrading");
            Analysis::degraded(ticket.id)
        } else {
            // Log the anonymized hash only, never raw ticket text.
            let analysis = analyzer.analyze(ticket.id, &text);
            debug!(
                ticket_id = ticket.id,
                text_id = %anon_hash(&text),
                confidence = analysis.overall_confidence,
                tags = analysis.tags.len(),
                "analyzed"
            );
            analysis
        };
        counter!("tickets_analyzed_total").increment(1);
        analyses.push(analysis);
        by_id.insert(ticket.id, ticket);
    }

    let result = batch_apply(&analyses, &by_id, config, writer).await;
    gauge!("batch_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    info!(
        processed = result.processed,
        tagged = result.tagged,
        skipped = result.skipped,
        errors = result.errors,
        "batch done"
    );
    Ok(result)
}
