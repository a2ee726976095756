use std::sync::Arc;

use crate::{config::AppConfig, services::warehouse::TripSource};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub warehouse: Arc<dyn TripSource>,
}

impl AppState {
    pub fn new(config: AppConfig, warehouse: Arc<dyn TripSource>) -> Self {
        Self { config, warehouse }
    }

    pub fn trips_table(&self) -> String {
        self.config.warehouse.qualified_table()
    }
}
