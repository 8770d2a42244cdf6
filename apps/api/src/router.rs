use std::sync::Arc;

use axum::{
    Router,
    response::Json,
    routing::get,
};
use serde_json::{json, Value};

use catalog_cell::router::catalog_routes;
use identity_cell::router::identity_routes;
use scheduling_cell::{scheduling_routes, SchedulingState};
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, scheduling_state: SchedulingState) -> Router {
    let api_routes = Router::new()
        .merge(scheduling_routes(scheduling_state))
        .merge(catalog_routes(config.clone()))
        .merge(identity_routes(config.clone()))
        .route("/health", get(health_check));

    Router::new()
        .route("/", get(|| async { "Aurum Salon API is running!" }))
        .nest("/api/v1", api_routes)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "aurum-salon-api",
    }))
}
