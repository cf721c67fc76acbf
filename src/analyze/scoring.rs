//! Confidence normalization helpers.
//!
//! Each dimension maps its raw score to a clamped [0,1] confidence with its
//! own divisor; the overall confidence is the unweighted mean of the top
//! category, priority, and sentiment confidences plus a text-length factor.
//! Confidences are normalized strengths, not probabilities.

use crate::analysis::clamp01;

/// Category raw score divisor: five weighted hits saturate confidence.
pub const CATEGORY_NORM: f32 = 5.0;
/// Priority winner-tier weight divisor: the top tier weight saturates.
pub const PRIORITY_NORM: f32 = 3.0;
/// Sentiment total-hit divisor: three sentiment words saturate.
pub const SENTIMENT_NORM: f32 = 3.0;
/// Characters of ticket text that count as "long enough".
pub const LENGTH_NORM: f32 = 500.0;

/// Flat confidence when no priority keyword matched: "no strong signal either
/// way", deliberately not zero. Observed behavior, kept as-is and flagged in
/// tests.
pub const PRIORITY_NO_SIGNAL_CONFIDENCE: f32 = 0.5;

pub fn category_confidence(score: f32) -> f32 {
    clamp01(score / CATEGORY_NORM)
}

pub fn priority_confidence(winning_tier_weight: f32) -> f32 {
    clamp01(winning_tier_weight / PRIORITY_NORM)
}

pub fn sentiment_confidence(total_hits: u32) -> f32 {
    clamp01(total_hits as f32 / SENTIMENT_NORM)
}

/// Length factor: rewards longer, more keyword-rich tickets.
pub fn length_factor(chars: usize) -> f32 {
    clamp01(chars as f32 / LENGTH_NORM)
}

/// Unweighted mean of the four signals. `top_category_confidence` is 0 when no
/// category matched. Blending heterogeneous signals instead of requiring all
/// four to agree is a documented tradeoff.
pub fn overall_confidence(
    top_category_confidence: f32,
    priority_confidence: f32,
    sentiment_confidence: f32,
    text_chars: usize,
) -> f32 {
    clamp01(
        (top_category_confidence
            + priority_confidence
            + sentiment_confidence
            + length_factor(text_chars))
            / 4.0,
    )
}
