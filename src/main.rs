//! casx - flatten WebAnno/INCEpTION clinical annotation exports into tables.
//!
//! Reads UIMA CAS JSON documents and writes one CSV row per Medical and
//! Abbreviation mention and per Causes and Refers_to relation.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Tables may go to stdout, so logs stay on stderr
    let default_filter = if cli::is_verbose() {
        "cas_extract=info,casx=info"
    } else {
        "cas_extract=warn,casx=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run().await
}
