//! Fetch bank quotes once and print the resolved rate table as JSON.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spendtrack_fx::{BankApiSource, FxConfig, FxEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the table.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let config = FxConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(
        api_url = %config.api_url,
        home = %config.home,
        tracked = config.tracked.len(),
        "Fetching currency rates"
    );

    let source = Arc::new(BankApiSource::new(&config.api_url, config.request_timeout)?);
    let engine = FxEngine::new(source, config);

    let table = engine.currency_rates().await?;
    println!("{}", serde_json::to_string_pretty(&table)?);

    Ok(())
}
