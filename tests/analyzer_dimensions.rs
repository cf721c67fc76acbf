// tests/analyzer_dimensions.rs
//
// Analyzer behavior against the compiled-in rule tables: neutral defaults,
// monotonicity, and the two end-to-end text scenarios.

use std::sync::Arc;

use helpdesk_auto_tagger::analysis::{Sentiment, NORMAL_PRIORITY};
use helpdesk_auto_tagger::analyze::scoring;
use helpdesk_auto_tagger::{Analyzer, RuleTables, PROCESSED_TAG};

fn analyzer() -> Analyzer {
    Analyzer::new(Arc::new(RuleTables::embedded().clone()))
}

#[test]
fn zero_match_text_yields_neutral_defaults() {
    let a = analyzer();
    let text = "lorem ipsum dolor sit amet consectetur adipiscing elit";
    let res = a.analyze(1, text);

    assert!(res.categories.is_empty());
    assert!(res.products.is_empty());
    assert_eq!(res.priority.label, NORMAL_PRIORITY);
    assert_eq!(res.sentiment.label, Sentiment::Neutral);
    assert_eq!(res.sentiment.score, 0);

    // Overall is the mean of (0, 0.5, 0, length factor). The 0.5 is the
    // priority no-signal floor, deliberately preserved (not zero).
    let expected = (0.5 + scoring::length_factor(text.chars().count())) / 4.0;
    assert!((res.overall_confidence - expected).abs() < 1e-6);

    // Only the processed marker is emitted.
    assert_eq!(res.tags, vec![PROCESSED_TAG.to_string()]);
}

#[test]
fn more_distinct_keywords_never_decrease_score_or_confidence() {
    let a = analyzer();
    let one = a.analyze(1, "we hit an error");
    let two = a.analyze(1, "we hit an error and a bug");

    let s1 = one.top_category().map(|c| c.score).unwrap_or(0.0);
    let s2 = two.top_category().map(|c| c.score).unwrap_or(0.0);
    assert!(s2 >= s1);

    let c1 = one.top_category().map(|c| c.confidence).unwrap_or(0.0);
    let c2 = two.top_category().map(|c| c.confidence).unwrap_or(0.0);
    assert!(c2 >= c1);
}

#[test]
fn repeated_occurrences_never_decrease_score() {
    let a = analyzer();
    let once = a.analyze(1, "error");
    let thrice = a.analyze(1, "error error error");
    let s1 = once.top_category().map(|c| c.score).unwrap_or(0.0);
    let s3 = thrice.top_category().map(|c| c.score).unwrap_or(0.0);
    assert!(s3 >= s1);
}

#[test]
fn scenario_urgent_production_outage() {
    let a = analyzer();
    let res = a.analyze(
        100,
        "URGENT: production API down, 500 errors, revenue impact",
    );

    let top = res.top_category().expect("technical category");
    assert_eq!(top.label, "technical");
    assert!(top.matched.contains(&"api".to_string()));
    assert!(top.matched.contains(&"500 error".to_string()));

    assert_eq!(res.priority.label, "urgent");
    assert_eq!(res.sentiment.label, Sentiment::Neutral);
    assert!(res.products.iter().any(|p| p.label == "api"));

    assert!(res.tags.contains(&PROCESSED_TAG.to_string()));
    assert!(res.tags.contains(&"category-technical".to_string()));
    assert!(res.tags.contains(&"priority-urgent".to_string()));
    assert!(res.tags.contains(&"needs-tech-review".to_string()));
}

#[test]
fn scenario_happy_customer() {
    let a = analyzer();
    let res = a.analyze(
        101,
        "Thanks so much, your team was amazing and fixed everything!",
    );

    assert_eq!(res.sentiment.label, Sentiment::Positive);
    assert!(res.sentiment.score >= 1);
    assert_eq!(res.priority.label, NORMAL_PRIORITY);

    assert!(res.tags.contains(&PROCESSED_TAG.to_string()));
    assert!(res.tags.contains(&"sentiment-positive".to_string()));
    assert!(!res.tags.iter().any(|t| t.starts_with("priority-")));
}

#[test]
fn generated_tags_have_no_duplicates() {
    let a = analyzer();
    let res = a.analyze(1, "urgent billing error: overcharged invoice, api refund broken asap");
    let mut sorted = res.tags.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(res.tags.len(), sorted.len());
}
