// Migration runner
// Embedded Diesel migrations so the binary can bootstrap its own schema

use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

use crate::db::MIGRATIONS;

/// Whether migrations should run at startup (env-controlled)
pub fn should_run_migrations() -> bool {
    crate::app_config::config().run_migrations
}

/// Run all pending Diesel migrations.
/// Returns the number of migrations applied.
pub async fn run_migrations() -> Result<usize, Box<dyn Error + Send + Sync>> {
    info!("[DIESEL] Starting migration process...");

    // MigrationHarness is sync, so run in a blocking task
    let database_url = crate::app_config::config().database_url.clone();

    let applied_count =
        tokio::task::spawn_blocking(move || -> Result<usize, Box<dyn Error + Send + Sync>> {
            let mut conn = PgConnection::establish(&database_url)
                .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

            let pending = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to check pending migrations: {}", e))?;

            if pending.is_empty() {
                debug!("[DIESEL] No pending migrations found");
                return Ok(0);
            }

            info!("[DIESEL] Found {} pending migrations", pending.len());

            let applied = conn
                .run_pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to run migrations: {}", e))?;

            for migration in &applied {
                debug!("[DIESEL] Applied migration: {}", migration);
            }

            Ok(applied.len())
        })
        .await
        .map_err(|e| format!("Migration task panicked: {}", e))??;

    info!("[DIESEL] Migration process completed ({} applied)", applied_count);
    Ok(applied_count)
}
