// tests/rules_config.rs
//
// Rule-table loading: env-path override, TOML and JSON formats, validation.
// Env-mutating tests are serialized.

use std::env;

use helpdesk_auto_tagger::analyze::rules::{RuleTables, ENV_RULES_PATH};

const TOML_RULES: &str = r#"
[[categories]]
label = "shipping"
keywords = ["Tracking Number", "parcel"]
weight = 1.5

[[priorities]]
label = "urgent"
keywords = ["urgent"]
weight = 3.0

[[priorities]]
label = "low"
keywords = ["whenever"]
weight = 1.0

[sentiment]
positive = ["great"]
negative = ["awful"]

[[products]]
label = "api"
keywords = ["api"]
"#;

#[test]
fn toml_tables_parse_and_normalize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(&path, TOML_RULES).unwrap();

    let tables = RuleTables::from_path(&path).unwrap();
    assert_eq!(tables.categories[0].label, "shipping");
    // Keywords are lowercased on load.
    assert_eq!(
        tables.categories[0].keywords,
        vec!["tracking number".to_string(), "parcel".to_string()]
    );
}

#[test]
fn json_tables_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(
        &path,
        r#"{
            "categories": [{"label": "x", "keywords": ["kw"], "weight": 1.0}],
            "priorities": [{"label": "urgent", "keywords": ["urgent"], "weight": 3.0}],
            "sentiment": {"positive": ["great"], "negative": ["awful"]},
            "products": [{"label": "api", "keywords": ["api"]}]
        }"#,
    )
    .unwrap();
    let tables = RuleTables::from_path(&path).unwrap();
    assert_eq!(tables.priorities[0].weight, 3.0);
}

#[test]
fn zero_weight_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(
        &path,
        r#"{
            "categories": [{"label": "x", "keywords": ["kw"], "weight": 0.0}],
            "priorities": [{"label": "urgent", "keywords": ["urgent"], "weight": 3.0}],
            "sentiment": {"positive": [], "negative": []},
            "products": []
        }"#,
    )
    .unwrap();
    let err = RuleTables::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("non-positive weight"));
}

#[serial_test::serial]
#[test]
fn load_default_honors_env_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(&path, TOML_RULES).unwrap();

    env::set_var(ENV_RULES_PATH, path.display().to_string());
    let tables = RuleTables::load_default().unwrap();
    assert_eq!(tables.categories[0].label, "shipping");
    env::remove_var(ENV_RULES_PATH);

    // Without the env var we get the embedded defaults back.
    let tables = RuleTables::load_default().unwrap();
    assert_eq!(&*tables, RuleTables::embedded());
}

#[serial_test::serial]
#[test]
fn load_default_with_missing_file_errors() {
    env::set_var(ENV_RULES_PATH, "/nonexistent/rules.toml");
    assert!(RuleTables::load_default().is_err());
    env::remove_var(ENV_RULES_PATH);
}
