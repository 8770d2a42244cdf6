// libs/catalog-cell/src/handlers.rs
use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use identity_cell::services::roles::RoleService;
use shared_config::AppConfig;
use shared_models::{AppError, User};

use crate::models::{CatalogError, UpdateServicesRequest};
use crate::services::catalog::CatalogService;

#[axum::debug_handler]
pub async fn get_salon(State(config): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let catalog_service = CatalogService::new(&config);

    let salon = catalog_service.get_config().await.map_err(|e| match e {
        CatalogError::NotFound => AppError::NotFound("Salon configuration not found".to_string()),
        other => AppError::Internal(other.to_string()),
    })?;

    Ok(Json(json!({ "salon": salon })))
}

#[axum::debug_handler]
pub async fn update_services(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateServicesRequest>,
) -> Result<Json<Value>, AppError> {
    let role_service = RoleService::new(&config);
    let is_staff = role_service
        .is_staff(&user.id)
        .await
        .map_err(|e| AppError::Internal(format!("Role lookup failed: {}", e)))?;

    if !is_staff {
        return Err(AppError::Auth("Staff role required".to_string()));
    }

    let catalog_service = CatalogService::new(&config);
    let salon = catalog_service
        .update_services(request)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound => {
                AppError::NotFound("Salon configuration not found".to_string())
            }
            CatalogError::ValidationError(msg) => AppError::ValidationError(msg),
            other => AppError::Internal(other.to_string()),
        })?;

    info!("Services list replaced by user {}", user.id);

    Ok(Json(json!({
        "success": true,
        "salon": salon,
    })))
}
