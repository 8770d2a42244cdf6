// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{AppError, User};

use crate::models::{BookAppointmentRequest, SchedulingError, UpdateStatusRequest};
use crate::state::SchedulingState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// Staff gate shared by the protected appointment routes.
async fn require_staff(state: &SchedulingState, user: &User) -> Result<(), AppError> {
    let is_staff = state
        .roles
        .is_staff(&user.id)
        .await
        .map_err(|e| AppError::Internal(format!("Role lookup failed: {}", e)))?;

    if !is_staff {
        return Err(AppError::Auth("Staff role required".to_string()));
    }
    Ok(())
}

// ==============================================================================
// PUBLIC ROUTES
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<SchedulingState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state
        .scheduling_service()
        .book_appointment(request)
        .await
        .map_err(|e| match e {
            SchedulingError::SlotRejected(outcome) => {
                AppError::Conflict(format!("Slot not available: {}", outcome))
            }
            SchedulingError::ValidationError(msg) => AppError::ValidationError(msg),
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
        })),
    ))
}

#[axum::debug_handler]
pub async fn day_availability(
    State(state): State<SchedulingState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = state.scheduling_service();
    let availability = service
        .availability()
        .day_availability(query.date)
        .await
        .map_err(|e| match e {
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn queue_view(State(state): State<SchedulingState>) -> Result<Json<Value>, AppError> {
    let view = state.queue_view.current().await.map_err(|e| match e {
        SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
        other => AppError::Internal(other.to_string()),
    })?;

    Ok(Json(json!(view)))
}

// ==============================================================================
// STAFF ROUTES
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, &user).await?;

    let appointments = state
        .scheduling_service()
        .list_appointments(query.date)
        .await
        .map_err(|e| match e {
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    let total = appointments.len();
    Ok(Json(json!({
        "appointments": appointments,
        "total": total,
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, &user).await?;

    let appointment = state
        .scheduling_service()
        .get_appointment(appointment_id)
        .await
        .map_err(|e| match e {
            SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, &user).await?;

    let appointment = state
        .scheduling_service()
        .update_status(appointment_id, request.status)
        .await
        .map_err(|e| match e {
            SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            SchedulingError::InvalidTransition { from, to } => {
                AppError::Conflict(format!("Cannot transition from {} to {}", from, to))
            }
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn add_to_queue(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, &user).await?;

    let appointment = state
        .scheduling_service()
        .add_to_queue(appointment_id)
        .await
        .map_err(|e| match e {
            SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            SchedulingError::InvalidTransition { from, to } => {
                AppError::Conflict(format!("Cannot transition from {} to {}", from, to))
            }
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, &user).await?;

    state
        .scheduling_service()
        .delete_appointment(appointment_id)
        .await
        .map_err(|e| match e {
            SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            SchedulingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted",
    })))
}
