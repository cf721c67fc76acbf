//! Tag policy — pure mapping from an `Analysis` to an ordered tag set.
//!
//! Each emission rule is gated by its own confidence threshold. Output order
//! is deterministic (processed marker first, then category, priority,
//! sentiment, product, secondary tags) for display and tests; the applier only
//! relies on set membership.

use crate::analysis::{Analysis, Sentiment, NORMAL_PRIORITY};

/// Sentinel marking a ticket as analyzed; the fetch layer excludes tickets
/// carrying it from future runs, which is what makes the pipeline idempotent.
pub const PROCESSED_TAG: &str = "auto-triaged";
/// Added alongside the marker when a ticket's text could not be analyzed.
pub const ANALYSIS_FAILED_TAG: &str = "analysis-failed";

// Policy constants, not derived from anything.
pub const CATEGORY_TAG_THRESHOLD: f32 = 0.3;
pub const PRIORITY_TAG_THRESHOLD: f32 = 0.5;
pub const SENTIMENT_TAG_THRESHOLD: f32 = 0.4;
pub const PRODUCT_TAG_THRESHOLD: f32 = 0.3;
pub const SECONDARY_TAG_THRESHOLD: f32 = 0.6;

/// Fixed secondary tag per category label; categories without an entry emit
/// nothing extra.
pub fn secondary_tag(category_label: &str) -> Option<&'static str> {
    match category_label {
        "technical" => Some("needs-tech-review"),
        "billing" => Some("billing-inquiry"),
        "account" => Some("account-security-review"),
        _ => None,
    }
}

/// Generate the ordered, de-duplicated tag set for one analysis.
pub fn generate_tags(analysis: &Analysis) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    // 1) Always mark as processed.
    tags.push(PROCESSED_TAG.to_string());

    // 2) Top category, if confident enough.
    if let Some(top) = analysis.top_category() {
        if top.confidence > CATEGORY_TAG_THRESHOLD {
            tags.push(format!("category-{}", top.label));
        }
    }

    // 3) Priority, only when a real level was detected.
    if analysis.priority.label != NORMAL_PRIORITY
        && analysis.priority.confidence > PRIORITY_TAG_THRESHOLD
    {
        tags.push(format!("priority-{}", analysis.priority.label));
    }

    // 4) Sentiment, only when non-neutral.
    if analysis.sentiment.label != Sentiment::Neutral
        && analysis.sentiment.confidence > SENTIMENT_TAG_THRESHOLD
    {
        tags.push(format!("sentiment-{}", analysis.sentiment.label.as_str()));
    }

    // 5) Top product, if confident enough.
    if let Some(top) = analysis.top_product() {
        if top.confidence > PRODUCT_TAG_THRESHOLD {
            tags.push(format!("product-{}", top.label));
        }
    }

    // 6) Secondary tags for EVERY sufficiently confident category, not just
    //    the top one.
    for cat in &analysis.categories {
        if cat.confidence > SECONDARY_TAG_THRESHOLD {
            if let Some(extra) = secondary_tag(&cat.label) {
                tags.push(extra.to_string());
            }
        }
    }

    // 7) Set semantics, first occurrence wins.
    dedup_preserve_order(tags)
}

/// Remove duplicates while keeping first-occurrence order.
pub fn dedup_preserve_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CategoryMatch, PriorityMatch, ProductMatch, SentimentMatch};

    fn base_analysis() -> Analysis {
        Analysis {
            ticket_id: 1,
            categories: Vec::new(),
            priority: PriorityMatch {
                label: NORMAL_PRIORITY.to_string(),
                score: 0.0,
                matched: Vec::new(),
                confidence: 0.5,
            },
            sentiment: SentimentMatch {
                label: Sentiment::Neutral,
                score: 0,
                matched: Vec::new(),
                confidence: 0.0,
            },
            products: Vec::new(),
            tags: Vec::new(),
            overall_confidence: 0.0,
        }
    }

    fn cat(label: &str, confidence: f32) -> CategoryMatch {
        CategoryMatch {
            label: label.to_string(),
            score: confidence * 5.0,
            matched: Vec::new(),
            confidence,
        }
    }

    #[test]
    fn marker_is_always_first() {
        let tags = generate_tags(&base_analysis());
        assert_eq!(tags, vec![PROCESSED_TAG.to_string()]);
    }

    #[test]
    fn category_threshold_is_strict() {
        let mut a = base_analysis();
        a.categories = vec![cat("billing", 0.3)];
        assert!(!generate_tags(&a).contains(&"category-billing".to_string()));

        a.categories = vec![cat("billing", 0.31)];
        assert!(generate_tags(&a).contains(&"category-billing".to_string()));
    }

    #[test]
    fn priority_tag_requires_non_normal_and_confidence() {
        let mut a = base_analysis();
        a.priority.label = "urgent".to_string();
        a.priority.confidence = 0.5;
        assert!(!generate_tags(&a).iter().any(|t| t.starts_with("priority-")));

        a.priority.confidence = 1.0;
        assert!(generate_tags(&a).contains(&"priority-urgent".to_string()));
    }

    #[test]
    fn sentiment_tag_requires_non_neutral() {
        let mut a = base_analysis();
        a.sentiment.label = Sentiment::Positive;
        a.sentiment.confidence = 0.9;
        assert!(generate_tags(&a).contains(&"sentiment-positive".to_string()));

        a.sentiment.label = Sentiment::Neutral;
        assert!(!generate_tags(&a).iter().any(|t| t.starts_with("sentiment-")));
    }

    #[test]
    fn product_tag_uses_top_product() {
        let mut a = base_analysis();
        a.products = vec![
            ProductMatch {
                label: "api".to_string(),
                matched: vec!["api".into(), "sdk".into()],
                confidence: 0.4,
            },
            ProductMatch {
                label: "web".to_string(),
                matched: vec!["browser".into()],
                confidence: 0.2,
            },
        ];
        let tags = generate_tags(&a);
        assert!(tags.contains(&"product-api".to_string()));
        assert!(!tags.contains(&"product-web".to_string()));
    }

    #[test]
    fn secondary_tags_cover_all_confident_categories() {
        let mut a = base_analysis();
        a.categories = vec![cat("technical", 0.9), cat("billing", 0.7), cat("support", 0.8)];
        let tags = generate_tags(&a);
        assert!(tags.contains(&"needs-tech-review".to_string()));
        assert!(tags.contains(&"billing-inquiry".to_string()));
        // "support" has no secondary tag defined: marker + two secondaries.
        assert_eq!(tags.iter().filter(|t| !t.starts_with("category-")).count(), 3);
    }

    #[test]
    fn output_has_no_duplicates() {
        let mut a = base_analysis();
        a.categories = vec![cat("technical", 0.9), cat("technical", 0.9)];
        let tags = generate_tags(&a);
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tags.len(), sorted.len());
    }
}
