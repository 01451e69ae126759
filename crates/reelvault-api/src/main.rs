mod auth;
mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use reelvault_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env in development; missing file is fine.
    dotenvy::dotenv().ok();

    telemetry::init_telemetry();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
