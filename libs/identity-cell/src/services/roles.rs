// libs/identity-cell/src/services/roles.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};

use crate::models::{AdminUser, AppRole, RoleError, RoleGrant};

/// Reads and manages role grants in the `user_roles` table.
///
/// Queries run with the service role key: role checks must work even when the
/// caller's own row-level access does not cover `user_roles`.
pub struct RoleService {
    supabase: SupabaseClient,
    service_role_key: String,
}

impl RoleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn service_token(&self) -> Option<&str> {
        if self.service_role_key.is_empty() {
            None
        } else {
            Some(self.service_role_key.as_str())
        }
    }

    /// All grants held by a user, oldest first.
    pub async fn list_role_grants(&self, user_id: &str) -> Result<Vec<RoleGrant>, RoleError> {
        debug!("Fetching role grants for user {}", user_id);

        let path = format!(
            "/rest/v1/user_roles?user_id=eq.{}&order=created_at.asc",
            user_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, self.service_token(), None)
            .await
            .map_err(|e| RoleError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<RoleGrant>, _>>()
            .map_err(|e| RoleError::DatabaseError(format!("Failed to parse role grants: {}", e)))
    }

    pub async fn roles_for(&self, user_id: &str) -> Result<Vec<AppRole>, RoleError> {
        Ok(self
            .list_role_grants(user_id)
            .await?
            .into_iter()
            .map(|grant| grant.role)
            .collect())
    }

    /// Staff means holding at least one of the `admin` or `barber` roles.
    pub async fn is_staff(&self, user_id: &str) -> Result<bool, RoleError> {
        Ok(self
            .roles_for(user_id)
            .await?
            .iter()
            .any(|role| role.is_staff()))
    }

    pub async fn is_admin(&self, user_id: &str) -> Result<bool, RoleError> {
        Ok(self.roles_for(user_id).await?.contains(&AppRole::Admin))
    }

    /// Grant a role to a user. The unique index on (user_id, role) turns a
    /// repeat grant into a conflict.
    pub async fn grant_role(&self, user_id: &Uuid, role: AppRole) -> Result<RoleGrant, RoleError> {
        info!("Granting role {} to user {}", role, user_id);

        let grant_data = json!({
            "user_id": user_id,
            "role": role.to_string(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/user_roles",
                self.service_token(),
                Some(grant_data),
                Some(headers),
            )
            .await
            .map_err(|e| match e {
                SupabaseError::Conflict(_) => RoleError::DuplicateGrant,
                other => RoleError::DatabaseError(other.to_string()),
            })?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| RoleError::DatabaseError("Grant insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| RoleError::DatabaseError(format!("Failed to parse role grant: {}", e)))
    }

    /// Revoke a role from a user. A missing grant surfaces as `NotFound`.
    pub async fn revoke_role(&self, user_id: &Uuid, role: AppRole) -> Result<(), RoleError> {
        info!("Revoking role {} from user {}", role, user_id);

        let path = format!("/rest/v1/user_roles?user_id=eq.{}&role=eq.{}", user_id, role);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                self.service_token(),
                None,
                Some(headers),
            )
            .await
            .map_err(|e| RoleError::DatabaseError(e.to_string()))?;

        if deleted.is_empty() {
            warn!("No {} grant to revoke for user {}", role, user_id);
            return Err(RoleError::NotFound);
        }

        Ok(())
    }

    /// Users with their aggregated grants, newest accounts first.
    pub async fn list_users(&self) -> Result<Vec<AdminUser>, RoleError> {
        debug!("Listing users from admin_users_view");

        let result: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/admin_users_view?order=created_at.desc",
                self.service_token(),
                None,
            )
            .await
            .map_err(|e| RoleError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AdminUser>, _>>()
            .map_err(|e| RoleError::DatabaseError(format!("Failed to parse users: {}", e)))
    }
}
