//! Helpdesk Auto-Tagger — Service Entrypoint
//! Boots the Axum HTTP server exposing the analyzer (analyze/preview) and the
//! Prometheus /metrics endpoint. Actual tag writes happen through the
//! `run_batch` binary, not this service.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use helpdesk_auto_tagger::analyze::rules::RuleTables;
use helpdesk_auto_tagger::analyze::Analyzer;
use helpdesk_auto_tagger::api::{self, AppState};
use helpdesk_auto_tagger::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("helpdesk_auto_tagger=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let rules = RuleTables::load_default()?;
    let analyzer = Arc::new(Analyzer::new(rules));

    let metrics = Metrics::init();
    let router = api::create_router(AppState { analyzer }).merge(metrics.router());

    let addr = std::env::var("TAGGER_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
