use crate::core::config::DatabaseConfig;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::time::Duration;

const APPLICATION_NAME: &str = "cloud-drive";

/// Connection pool tagged with the application name in `pg_stat_activity`
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = config
        .url
        .parse::<PgConnectOptions>()?
        .application_name(APPLICATION_NAME);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect_with(options)
        .await?;

    tracing::debug!(
        "Postgres pool ready: min={}, max={}",
        config.min_connections,
        config.max_connections
    );

    Ok(pool)
}

/// Apply the embedded migrations (users, folders, files, shared_files)
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
