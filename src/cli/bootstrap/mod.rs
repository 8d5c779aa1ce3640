//! Bootstrap command - one-shot schema and admin key setup

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::api_key::BootstrapOutcome;
use crate::infrastructure::logging;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let stores = crate::open_stores(&config).await?;
    let outcome =
        crate::bootstrap_admin(stores.keys, crate::credential_sink(&config.auth)).await?;

    match outcome {
        BootstrapOutcome::Created(key_id) => info!(key_id = %key_id, "Bootstrap complete"),
        BootstrapOutcome::AlreadyPresent => info!("Bootstrap not needed"),
    }

    Ok(())
}
