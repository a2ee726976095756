use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use tracing::{debug, warn};

use crate::{
    config::WarehouseConfig,
    db::{self, DbPool},
    error::AppError,
    models::trip::{TripDataset, TripRecord},
    services::query::TripQuery,
};

/// Anything that can run a [`TripQuery`] and hand back every matching row.
#[async_trait]
pub trait TripSource: Send + Sync {
    async fn fetch_trips(&self, query: &TripQuery) -> Result<TripDataset, AppError>;
}

enum Connector {
    PerFetch(SqliteConnectOptions),
    Pooled(DbPool),
}

/// SQL warehouse reached through sqlx.
pub struct SqlWarehouse {
    connector: Connector,
}

impl SqlWarehouse {
    pub fn from_config(config: &WarehouseConfig) -> Result<Self, AppError> {
        let options = db::connect_options(&config.url)?;
        Ok(if config.pool_size == 0 {
            Self::per_fetch(options)
        } else {
            Self::pooled(db::init_pool(options, config.pool_size))
        })
    }

    /// Opens a connection for each fetch and closes it before returning.
    pub fn per_fetch(options: SqliteConnectOptions) -> Self {
        Self {
            connector: Connector::PerFetch(options),
        }
    }

    pub fn pooled(pool: DbPool) -> Self {
        Self {
            connector: Connector::Pooled(pool),
        }
    }
}

#[async_trait]
impl TripSource for SqlWarehouse {
    #[tracing::instrument(skip_all, fields(lookback = %query.lookback(), region = ?query.region()))]
    async fn fetch_trips(&self, query: &TripQuery) -> Result<TripDataset, AppError> {
        let mut builder = query.builder();
        debug!(sql = builder.sql(), "executing trip query");

        let rows = match &self.connector {
            Connector::Pooled(pool) => {
                let mut conn = pool.acquire().await.map_err(AppError::connection)?;
                builder
                    .build_query_as::<TripRecord>()
                    .fetch_all(&mut *conn)
                    .await?
            }
            Connector::PerFetch(options) => {
                let mut conn = SqliteConnection::connect_with(options)
                    .await
                    .map_err(AppError::connection)?;
                let fetched = builder
                    .build_query_as::<TripRecord>()
                    .fetch_all(&mut conn)
                    .await;
                if let Err(err) = conn.close().await {
                    warn!(error = %err, "closing warehouse connection failed");
                }
                fetched?
            }
        };

        debug!(rows = rows.len(), "trip query returned");
        Ok(TripDataset::from(rows))
    }
}
