//! Intake Bot - Main entry point.

use anyhow::{Context, Result};
use intake_bot::start_bot;
use intake_common::config::Config;
use intake_common::logging::init_logging;
use intake_common::validation::Validate;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Intake Bot v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e).context("Configuration is not usable, fix it and restart");
    }

    start_bot(&config).await
}
