// libs/catalog-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Salon configuration routes. The storefront reads `/salon` anonymously;
/// editing the services list is staff-only.
pub fn catalog_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/salon", get(handlers::get_salon));

    let protected_routes = Router::new()
        .route("/salon/services", put(handlers::update_services))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
