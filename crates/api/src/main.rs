use anyhow::{Context, Result};
use pickup_core::SiteConfig;
use pickup_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("pickup_api");

    let config = SiteConfig::from_env().context("invalid site configuration")?;
    pickup_api::serve(config).await
}
