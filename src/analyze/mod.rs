// src/analyze/mod.rs
//! Content analyzer: pure function of (ticket text, rule tables) producing an
//! `Analysis`. Total and deterministic; absence of matches yields neutral
//! defaults, never an error. No I/O and no mutation in this module.
//!
//! Matching is a literal case-insensitive substring scan per keyword per rule.
//! That is intentional and simple ("api" also matches inside "capitalize");
//! switching to tokenization would change match counts and is a behavior
//! change, not a cleanup.

pub mod rules;
pub mod scoring;

use std::sync::Arc;

use crate::analysis::{
    clamp01, Analysis, CategoryMatch, PriorityMatch, ProductMatch, Sentiment, SentimentMatch,
    NORMAL_PRIORITY,
};
use rules::{KeywordRule, ProductFamily, RuleTables, SentimentLexicon};

/// Analyzer over one immutable rule-table set.
#[derive(Debug, Clone)]
pub struct Analyzer {
    rules: Arc<RuleTables>,
}

impl Analyzer {
    pub fn new(rules: Arc<RuleTables>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTables {
        &self.rules
    }

    /// Analyze one ticket text. The generated tag list is filled in from the
    /// tag policy so the `Analysis` is self-contained for the applier.
    pub fn analyze(&self, ticket_id: u64, text: &str) -> Analysis {
        let lc = text.to_lowercase();

        let categories = scan_categories(&lc, &self.rules.categories);
        let priority = scan_priority(&lc, &self.rules.priorities);
        let sentiment = scan_sentiment(&lc, &self.rules.sentiment);
        let products = scan_products(&lc, &self.rules.products);

        let overall = scoring::overall_confidence(
            categories.first().map(|c| c.confidence).unwrap_or(0.0),
            priority.confidence,
            sentiment.confidence,
            text.chars().count(),
        );

        let mut analysis = Analysis {
            ticket_id,
            categories,
            priority,
            sentiment,
            products,
            tags: Vec::new(),
            overall_confidence: overall,
        };
        analysis.tags = crate::tags::generate_tags(&analysis);
        analysis
    }
}

/// Multi-label category scan: each distinct matched keyword contributes the
/// rule's weight; only strictly positive sums are kept. Sorted descending by
/// raw score; the sort is stable, so equal scores keep rule-table order.
fn scan_categories(lc_text: &str, rules: &[KeywordRule]) -> Vec<CategoryMatch> {
    let mut out = Vec::new();
    for rule in rules {
        let matched: Vec<String> = rule
            .keywords
            .iter()
            .filter(|kw| lc_text.contains(kw.as_str()))
            .cloned()
            .collect();
        let score = matched.len() as f32 * rule.weight;
        if score > 0.0 {
            out.push(CategoryMatch {
                label: rule.label.clone(),
                score,
                matched,
                confidence: scoring::category_confidence(score),
            });
        }
    }
    out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Single-label, weighted max-wins priority scan. The highest-weight tier with
/// at least one hit wins, NOT the tier with the most hits; on equal weights the
/// tier scanned first wins. All matched keywords across all tiers are recorded
/// for explainability, independent of the winner.
fn scan_priority(lc_text: &str, tiers: &[KeywordRule]) -> PriorityMatch {
    let mut all_matched: Vec<String> = Vec::new();
    let mut score = 0.0f32;
    let mut winner: Option<&KeywordRule> = None;

    for tier in tiers {
        let mut tier_hit = false;
        for kw in &tier.keywords {
            if lc_text.contains(kw.as_str()) {
                tier_hit = true;
                score += tier.weight;
                all_matched.push(kw.clone());
            }
        }
        // Strict `>` keeps the first-scanned tier on equal weights.
        if tier_hit && winner.map_or(true, |w| tier.weight > w.weight) {
            winner = Some(tier);
        }
    }

    match winner {
        Some(tier) => PriorityMatch {
            label: tier.label.clone(),
            score,
            matched: all_matched,
            confidence: scoring::priority_confidence(tier.weight),
        },
        None => PriorityMatch {
            label: NORMAL_PRIORITY.to_string(),
            score: 0.0,
            matched: Vec::new(),
            confidence: scoring::PRIORITY_NO_SIGNAL_CONFIDENCE,
        },
    }
}

/// Signed-difference sentiment: every list term counts 1 when present, no
/// weighting. Label follows the sign of `positive - negative`.
fn scan_sentiment(lc_text: &str, lexicon: &SentimentLexicon) -> SentimentMatch {
    let pos: Vec<String> = lexicon
        .positive
        .iter()
        .filter(|w| lc_text.contains(w.as_str()))
        .cloned()
        .collect();
    let neg: Vec<String> = lexicon
        .negative
        .iter()
        .filter(|w| lc_text.contains(w.as_str()))
        .cloned()
        .collect();

    let (p, n) = (pos.len() as i32, neg.len() as i32);
    let label = if n > p {
        Sentiment::Negative
    } else if p > n {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    };

    let mut matched = pos;
    matched.extend(neg);

    SentimentMatch {
        label,
        score: (p - n).unsigned_abs(),
        matched,
        confidence: scoring::sentiment_confidence((p + n) as u32),
    }
}

/// Multi-label product scan: confidence is distinct-matched over family size.
/// Sorted descending by confidence; stable, so ties keep table order.
fn scan_products(lc_text: &str, families: &[ProductFamily]) -> Vec<ProductMatch> {
    let mut out = Vec::new();
    for fam in families {
        let matched: Vec<String> = fam
            .keywords
            .iter()
            .filter(|kw| lc_text.contains(kw.as_str()))
            .cloned()
            .collect();
        if !matched.is_empty() {
            let confidence = clamp01(matched.len() as f32 / fam.keywords.len() as f32);
            out.push(ProductMatch {
                label: fam.label.clone(),
                matched,
                confidence,
            });
        }
    }
    out.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(RuleTables::embedded().clone()))
    }

    #[test]
    fn category_scan_sums_rule_weight_per_distinct_keyword() {
        let a = analyzer();
        let res = a.analyze(1, "The API throws an error, another error, same error");
        let top = res.top_category().expect("technical should match");
        assert_eq!(top.label, "technical");
        // "api" + "error" = 2 distinct keywords at weight 2.0; repeats of the
        // same keyword do not add.
        assert!((top.score - 4.0).abs() < 1e-6);
        assert!(top.matched.contains(&"api".to_string()));
        assert!(top.matched.contains(&"error".to_string()));
    }

    #[test]
    fn priority_winner_is_highest_weight_tier_not_most_hits() {
        let a = analyzer();
        // Two hits in the high tier, one in the urgent tier: urgent wins.
        let res = a.analyze(1, "important deadline, and the site is down");
        assert_eq!(res.priority.label, "urgent");
        assert_eq!(res.priority.matched.len(), 3);
        assert!((res.priority.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn priority_without_matches_defaults_to_normal_half_confidence() {
        let a = analyzer();
        let res = a.analyze(1, "just a calm note about nothing in particular");
        assert_eq!(res.priority.label, NORMAL_PRIORITY);
        assert_eq!(res.priority.score, 0.0);
        assert!((res.priority.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sentiment_sign_and_score() {
        let a = analyzer();
        let res = a.analyze(1, "this is terrible and useless, but thanks");
        assert_eq!(res.sentiment.label, Sentiment::Negative);
        assert_eq!(res.sentiment.score, 1); // |1 - 2|
        assert!((res.sentiment.confidence - 1.0).abs() < 1e-6); // 3 hits / 3
    }

    #[test]
    fn product_confidence_is_fraction_of_family() {
        let a = analyzer();
        let res = a.analyze(1, "the webhook endpoint rejects my api call");
        let top = res.top_product().expect("api family should match");
        assert_eq!(top.label, "api");
        // api, endpoint, webhook out of the 6-keyword family
        assert!((top.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn substring_matching_is_literal_by_design() {
        let a = analyzer();
        // "down" inside "download" counts; this is the documented tradeoff of
        // substring scanning.
        let res = a.analyze(1, "the download link works fine");
        assert_eq!(res.priority.label, "urgent");
    }

    #[test]
    fn analysis_is_deterministic() {
        let a = analyzer();
        let text = "urgent api outage, very frustrated";
        assert_eq!(a.analyze(9, text), a.analyze(9, text));
    }
}
