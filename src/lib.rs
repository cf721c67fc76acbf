// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analysis;
pub mod analyze;
pub mod api;
pub mod apply;
pub mod helpdesk;
pub mod metrics;
pub mod pipeline;
pub mod tags;
pub mod ticket;

// ---- Re-exports for stable public API ----
pub use crate::analysis::{Analysis, CategoryMatch, PriorityMatch, ProductMatch, SentimentMatch};
pub use crate::analyze::{rules::RuleTables, Analyzer};
pub use crate::apply::{
    batch_apply, plan_apply, ApplyPlan, ApplyStatus, BatchResult, TagWriter, TaggingConfig,
    TicketOutcome,
};
pub use crate::pipeline::{run_batch, TicketSource};
pub use crate::tags::{generate_tags, PROCESSED_TAG};
pub use crate::ticket::Ticket;
