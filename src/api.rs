// src/api.rs
//! HTTP surface for inspecting the analyzer: /health, /analyze, /tags/preview.
//! Read-only; the batch binary is the only thing that writes to the helpdesk.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::analysis::Analysis;
use crate::analyze::Analyzer;
use crate::apply::{plan_apply, ApplyPlan, TaggingConfig};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/tags/preview", post(preview_tags))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
    #[serde(default)]
    ticket_id: Option<u64>,
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<Analysis> {
    let analysis = state
        .analyzer
        .analyze(body.ticket_id.unwrap_or(0), &body.text);
    Json(analysis)
}

#[derive(serde::Deserialize)]
struct PreviewReq {
    text: String,
    #[serde(default)]
    existing_tags: Vec<String>,
    /// Threshold check uses the default config unless overridden.
    #[serde(default)]
    min_confidence: Option<f32>,
}

#[derive(serde::Serialize)]
struct PreviewResp {
    overall_confidence: f32,
    generated_tags: Vec<String>,
    tags_to_apply: Vec<String>,
    would_apply: bool,
}

/// Dry-run view of the apply decision for ad-hoc text, without touching any
/// remote ticket.
async fn preview_tags(
    State(state): State<AppState>,
    Json(body): Json<PreviewReq>,
) -> Json<PreviewResp> {
    let analysis = state.analyzer.analyze(0, &body.text);
    let mut config = TaggingConfig::default();
    if let Some(mc) = body.min_confidence {
        config.min_confidence = mc.clamp(0.0, 1.0);
    }
    let (tags_to_apply, would_apply) = match plan_apply(&body.existing_tags, &analysis, &config) {
        ApplyPlan::Apply { tags_to_apply, .. } => (tags_to_apply, true),
        _ => (Vec::new(), false),
    };
    Json(PreviewResp {
        overall_confidence: analysis.overall_confidence,
        generated_tags: analysis.tags,
        tags_to_apply,
        would_apply,
    })
}
