// libs/identity-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{AppError, User};

use crate::models::{AppRole, GrantRoleRequest, RoleError};
use crate::services::roles::RoleService;

/// Every handler in this cell is admin-only. The auth middleware has already
/// verified the token; this checks the grant.
async fn require_admin(service: &RoleService, user: &User) -> Result<(), AppError> {
    let is_admin = service
        .is_admin(&user.id)
        .await
        .map_err(|e| AppError::Internal(format!("Role lookup failed: {}", e)))?;

    if !is_admin {
        return Err(AppError::Auth("Admin role required".to_string()));
    }

    Ok(())
}

#[axum::debug_handler]
pub async fn list_users(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let role_service = RoleService::new(&config);
    require_admin(&role_service, &user).await?;

    let users = role_service
        .list_users()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let total = users.len();
    Ok(Json(json!({
        "users": users,
        "total": total,
    })))
}

#[axum::debug_handler]
pub async fn grant_role(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<GrantRoleRequest>,
) -> Result<Json<Value>, AppError> {
    let role_service = RoleService::new(&config);
    require_admin(&role_service, &user).await?;

    let grant = role_service
        .grant_role(&user_id, request.role)
        .await
        .map_err(|e| match e {
            RoleError::DuplicateGrant => {
                AppError::Conflict("User already holds this role".to_string())
            }
            RoleError::InvalidRole(role) => {
                AppError::ValidationError(format!("Unknown role: {}", role))
            }
            other => AppError::Internal(other.to_string()),
        })?;

    info!("Role {} granted to user {} by {}", grant.role, user_id, user.id);

    Ok(Json(json!({
        "success": true,
        "grant": grant,
    })))
}

#[axum::debug_handler]
pub async fn revoke_role(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path((user_id, role)): Path<(Uuid, AppRole)>,
) -> Result<Json<Value>, AppError> {
    let role_service = RoleService::new(&config);
    require_admin(&role_service, &user).await?;

    role_service
        .revoke_role(&user_id, role)
        .await
        .map_err(|e| match e {
            RoleError::NotFound => AppError::NotFound("Role grant not found".to_string()),
            other => AppError::Internal(other.to_string()),
        })?;

    info!("Role {} revoked from user {} by {}", role, user_id, user.id);

    Ok(Json(json!({
        "success": true,
        "message": "Role revoked",
    })))
}
