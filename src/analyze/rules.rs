//! Rule tables: hand-authored weighted keyword dictionaries for the four
//! analysis dimensions (category, priority, sentiment, product).
//!
//! Compiled-in defaults live in `default_rules.json` at the repo root and are
//! parsed once. A deployment can override them with a TOML or JSON file via
//! `TAGGER_RULES_PATH`. Tables are immutable after load and passed explicitly
//! into the analyzer, so parallel test instances can carry different rules.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const ENV_RULES_PATH: &str = "TAGGER_RULES_PATH";

static EMBEDDED: Lazy<RuleTables> = Lazy::new(|| {
    let raw = include_str!("../../default_rules.json");
    let mut tables: RuleTables = serde_json::from_str(raw).expect("valid embedded rule tables");
    tables.normalize();
    tables
        .validate()
        .expect("embedded rule tables pass validation");
    tables
});

/// One labeled keyword rule: a set of normalized keywords and a positive weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
    pub weight: f32,
}

/// A product family: keyword list only, confidence is matched/total.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductFamily {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Unweighted positive/negative word lists for sentiment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// All four dimension tables. Entry order is meaningful: it is the documented
/// tie-break for equal category scores and equal priority tier weights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleTables {
    pub categories: Vec<KeywordRule>,
    /// Priority tiers in scan order; weights are expected to be distinct.
    pub priorities: Vec<KeywordRule>,
    pub sentiment: SentimentLexicon,
    pub products: Vec<ProductFamily>,
}

impl RuleTables {
    /// The compiled-in default tables.
    pub fn embedded() -> &'static RuleTables {
        &EMBEDDED
    }

    /// Load tables honoring `TAGGER_RULES_PATH`; falls back to the embedded
    /// defaults when the variable is unset or empty.
    pub fn load_default() -> Result<Arc<RuleTables>> {
        match std::env::var(ENV_RULES_PATH) {
            Ok(p) if !p.trim().is_empty() => {
                let tables = Self::from_path(Path::new(&p))?;
                Ok(Arc::new(tables))
            }
            _ => Ok(Arc::new(Self::embedded().clone())),
        }
    }

    /// Load and validate tables from a TOML or JSON file (picked by extension).
    pub fn from_path(path: &Path) -> Result<RuleTables> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading rule tables from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut tables: RuleTables = if ext == "toml" {
            toml::from_str(&content)
                .with_context(|| format!("parsing TOML rule tables {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON rule tables {}", path.display()))?
        };
        tables.normalize();
        tables.validate()?;
        Ok(tables)
    }

    /// Lowercase and trim every keyword, dropping empties and duplicates.
    /// Matching is a case-insensitive substring scan over lowercased text,
    /// so keywords must be stored lowercase.
    fn normalize(&mut self) {
        fn clean(list: &mut Vec<String>) {
            let mut out = Vec::with_capacity(list.len());
            for kw in list.drain(..) {
                let t = kw.trim().to_lowercase();
                if !t.is_empty() && !out.contains(&t) {
                    out.push(t);
                }
            }
            *list = out;
        }
        for rule in self.categories.iter_mut().chain(self.priorities.iter_mut()) {
            clean(&mut rule.keywords);
        }
        clean(&mut self.sentiment.positive);
        clean(&mut self.sentiment.negative);
        for fam in &mut self.products {
            clean(&mut fam.keywords);
        }
    }

    fn validate(&self) -> Result<()> {
        for rule in self.categories.iter().chain(self.priorities.iter()) {
            if rule.keywords.is_empty() {
                bail!("rule '{}' has no keywords", rule.label);
            }
            if !(rule.weight > 0.0) {
                bail!(
                    "rule '{}' has non-positive weight {}",
                    rule.label,
                    rule.weight
                );
            }
        }
        for fam in &self.products {
            if fam.keywords.is_empty() {
                bail!("product family '{}' has no keywords", fam.label);
            }
        }
        Ok(())
    }
}
