use tracing::info;
use tracing_subscriber::EnvFilter;

use estia_backend::app::AppState;
use estia_backend::app_config::config;
use estia_backend::db::{self, DieselDatabaseConfig};
use estia_backend::migrations;
use estia_backend::build_router;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("estia_backend=debug,tower_http=info")),
        )
        .init();

    let config = config();
    info!(
        "Starting estia-backend ({:?}) on {}",
        config.environment, config.bind_address
    );
    info!(
        "Database: {}",
        db::mask_connection_string(&config.database_url)
    );

    if migrations::should_run_migrations() {
        let applied = migrations::run_migrations().await?;
        info!("Applied {} migrations", applied);
    }

    let pool = db::create_diesel_pool(DieselDatabaseConfig::default()).await?;
    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
