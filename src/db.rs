use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::info;

use crate::{config::redact_url, error::AppError};

pub type DbPool = SqlitePool;

pub fn connect_options(url: &str) -> Result<SqliteConnectOptions, AppError> {
    SqliteConnectOptions::from_str(url)
        .map_err(|_| AppError::Config(format!("invalid WAREHOUSE_URL {}", redact_url(url))))
}

/// Connections are opened on first use, so an unreachable warehouse shows up
/// as a fetch failure instead of a startup failure.
pub fn init_pool(options: SqliteConnectOptions, max_connections: u32) -> DbPool {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(options)
}

/// Creates the trips table in a local warehouse file.
pub async fn bootstrap_schema(url: &str) -> Result<(), AppError> {
    let options = connect_options(url)?.create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(AppError::connection)?;
    let migrated = sqlx::migrate!("./migrations").run(&mut conn).await;
    conn.close().await?;
    migrated?;
    info!(url = %redact_url(url), "warehouse schema ready");
    Ok(())
}
