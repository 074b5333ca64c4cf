use anyhow::{Context, Result};
use dotenv::dotenv;
use shared::{
    config::{Config, ConnectionManager},
    utils::{Telemetry, init_logger},
};
use storefront::{handler::AppRouter, state::AppState};
use tracing::{error, info};

const SERVICE_NAME: &str = "storefront";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let mut telemetry = Telemetry::new(SERVICE_NAME, config.otel_endpoint.clone());

    let logger_provider = telemetry
        .init_logger()
        .context("Failed to initialize OTLP logger")?;
    telemetry
        .init_meter()
        .context("Failed to initialize OTLP meter")?;
    telemetry
        .init_tracer()
        .context("Failed to initialize OTLP tracer")?;

    let _log_guard = init_logger(&logger_provider, SERVICE_NAME)?;

    let pool = ConnectionManager::new_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        ConnectionManager::run_migrations(&pool).await?;
    }

    let state = AppState::new(pool, &config)
        .await
        .context("Failed to create AppState")?;

    if let Some(seed) = &config.admin_seed {
        state
            .di_container
            .auth_service
            .register
            .ensure_admin(&seed.email, &seed.password, seed.name.clone())
            .await
            .context("Failed to bootstrap admin account")?;
    }

    AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server")?;

    info!("Shutting down telemetry...");

    if let Err(e) = telemetry.shutdown() {
        error!("❌ {e:#}");
    }

    Ok(())
}
