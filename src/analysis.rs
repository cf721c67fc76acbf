//! analysis.rs — Structured output of the content analyzer: per-dimension
//! matches with normalized confidences, plus the blended overall confidence.
//!
//! Everything here is plain data produced once per ticket per run, consumed
//! immediately by the tag policy and the batch applier, never persisted.

use serde::{Deserialize, Serialize};

use crate::tags::{ANALYSIS_FAILED_TAG, PROCESSED_TAG};

/// Priority label used when no priority keyword matched.
pub const NORMAL_PRIORITY: &str = "normal";

/// Sentiment verdict. Fixed three-way regardless of rule configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// One category verdict: label, raw weighted score, matched keywords
/// (kept for explainability and tests), confidence in [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub label: String,
    pub score: f32,
    pub matched: Vec<String>,
    pub confidence: f32,
}

/// Single priority verdict, weighted max-wins across tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityMatch {
    pub label: String,
    /// Sum of matched keyword weights across all tiers, not just the winner.
    pub score: f32,
    /// Every matched priority keyword, independent of which tier won.
    pub matched: Vec<String>,
    pub confidence: f32,
}

/// Signed-difference sentiment verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentMatch {
    pub label: Sentiment,
    /// `|positive_hits - negative_hits|`.
    pub score: u32,
    pub matched: Vec<String>,
    pub confidence: f32,
}

/// One product-family verdict; confidence is matched/total for the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    pub label: String,
    pub matched: Vec<String>,
    pub confidence: f32,
}

/// Aggregate analysis for one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub ticket_id: u64,
    /// Sorted descending by raw score; ties keep rule-table order (stable sort).
    pub categories: Vec<CategoryMatch>,
    pub priority: PriorityMatch,
    pub sentiment: SentimentMatch,
    /// Sorted descending by confidence; ties keep rule-table order.
    pub products: Vec<ProductMatch>,
    /// Tags proposed by the tag policy for this analysis.
    pub tags: Vec<String>,
    /// Blend of the four dimension confidences and the text-length factor.
    /// Deterministic function of the analyzed text alone.
    pub overall_confidence: f32,
}

impl Analysis {
    /// Highest-scoring category, if any matched.
    pub fn top_category(&self) -> Option<&CategoryMatch> {
        self.categories.first()
    }

    /// Highest-confidence product, if any matched.
    pub fn top_product(&self) -> Option<&ProductMatch> {
        self.products.first()
    }

    /// Fallback analysis for a ticket whose text could not be analyzed.
    /// Zero confidence everywhere; tagged so the ticket is still marked as
    /// processed and flagged for a human look.
    pub fn degraded(ticket_id: u64) -> Self {
        Self {
            ticket_id,
            categories: Vec::new(),
            priority: PriorityMatch {
                label: NORMAL_PRIORITY.to_string(),
                score: 0.0,
                matched: Vec::new(),
                confidence: 0.0,
            },
            sentiment: SentimentMatch {
                label: Sentiment::Neutral,
                score: 0,
                matched: Vec::new(),
                confidence: 0.0,
            },
            products: Vec::new(),
            tags: vec![PROCESSED_TAG.to_string(), ANALYSIS_FAILED_TAG.to_string()],
            overall_confidence: 0.0,
        }
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
