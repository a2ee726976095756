pub mod dashboard;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(dashboard::router())
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}
