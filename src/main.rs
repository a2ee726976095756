use std::sync::Arc;

use taxi_dashboard::config::AppConfig;
use taxi_dashboard::db::bootstrap_schema;
use taxi_dashboard::error::AppError;
use taxi_dashboard::routes::create_router;
use taxi_dashboard::services::warehouse::SqlWarehouse;
use taxi_dashboard::state::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    info!(warehouse = ?config.warehouse, "configuration loaded");

    if config.warehouse.bootstrap {
        if let Err(err) = bootstrap_schema(&config.warehouse.url).await {
            error!("schema bootstrap failed: {err}");
            return Err(err);
        }
    }

    let warehouse = SqlWarehouse::from_config(&config.warehouse)?;
    let state = AppState::new(config.clone(), Arc::new(warehouse));

    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,taxi_dashboard=info".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
