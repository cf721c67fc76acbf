//! One-off batch run: fetch new tickets from the helpdesk, analyze, apply
//! tags, print the report. Configuration is environment-driven; dry-run is the
//! default, set TAGGER_DRY_RUN=0 to write for real.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use helpdesk_auto_tagger::analyze::rules::RuleTables;
use helpdesk_auto_tagger::analyze::Analyzer;
use helpdesk_auto_tagger::apply::{report, TaggingConfig};
use helpdesk_auto_tagger::helpdesk::HelpdeskClient;
use helpdesk_auto_tagger::pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("helpdesk_auto_tagger=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let rules = RuleTables::load_default()?;
    let analyzer = Analyzer::new(Arc::clone(&rules));
    let config = TaggingConfig::from_env();
    let client = HelpdeskClient::from_env()?;

    // A fetch failure propagates here and fails the run as a whole; per-ticket
    // failures are inside the BatchResult.
    let result = pipeline::run_batch(&client, &client, &analyzer, &config).await?;
    println!("{}", report::render_report(&result, 10));
    Ok(())
}
