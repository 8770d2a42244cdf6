// libs/scheduling-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::SchedulingState;

/// Appointment, availability and queue routes. Booking and the two read-only
/// displays are public; appointment management needs a valid token plus a
/// staff grant checked in the handlers.
pub fn scheduling_routes(state: SchedulingState) -> Router {
    let public_routes = Router::new()
        .route("/appointments", post(handlers::book_appointment))
        .route("/availability", get(handlers::day_availability))
        .route("/queue", get(handlers::queue_view));

    let protected_routes = Router::new()
        .route("/appointments", get(handlers::list_appointments))
        .route(
            "/appointments/{appointment_id}",
            get(handlers::get_appointment).delete(handlers::delete_appointment),
        )
        .route(
            "/appointments/{appointment_id}/status",
            patch(handlers::update_status),
        )
        .route(
            "/appointments/{appointment_id}/queue",
            post(handlers::add_to_queue),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
