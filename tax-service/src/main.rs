use anyhow::Context;
use service_core::observability::init_tracing;
use tax_service::{config::Config, models::Order, TaxPlugin};

/// Push one order snapshot to the TaxJar ledger.
///
/// Usage: `tax-sync <order.json>`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(
        &config.common.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;

    let path = std::env::args()
        .nth(1)
        .context("usage: tax-sync <order.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read order snapshot {path}"))?;
    let order: Order = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse order snapshot {path}"))?;

    if !config.taxjar_enabled() {
        anyhow::bail!("TAX__TAXJAR__API_KEY is not set");
    }

    let plugin = TaxPlugin::build(config, None)?;
    let outcome = plugin.ledger_sync().upsert(&order).await?;

    tracing::info!(order_id = order.id, outcome = outcome.as_str(), "Done");
    Ok(())
}
