use anyhow::{Context, Result};
use hello_weather::{AppState, HelloConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().context("Error loading .env file")?;

    let config = HelloConfig::load().context("Invalid configuration")?;
    logging::init(&config);
    tracing::debug!(?config, "Loaded configuration");

    let state = AppState::from_config(&config)?;
    web::run(config.port, state)
        .await
        .context("Error starting server")?;
    Ok(())
}
