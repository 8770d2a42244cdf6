// libs/identity-cell/src/router.rs
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Admin user and role management routes. Every route requires a valid bearer
/// token; the handlers additionally check for the admin grant.
pub fn identity_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/admin/users", get(handlers::list_users))
        .route("/admin/users/{user_id}/roles", post(handlers::grant_role))
        .route(
            "/admin/users/{user_id}/roles/{role}",
            delete(handlers::revoke_role),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
