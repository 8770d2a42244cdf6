// libs/identity-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// ROLE TYPES
// ==============================================================================

/// Roles recognised by the backend. Grants live in the `user_roles` table and
/// a user may hold several at once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    Barber,
    User,
}

impl AppRole {
    /// Roles that unlock appointment management and catalog editing.
    pub fn is_staff(&self) -> bool {
        matches!(self, AppRole::Admin | AppRole::Barber)
    }
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let role = match self {
            AppRole::Admin => "admin",
            AppRole::Barber => "barber",
            AppRole::User => "user",
        };
        write!(f, "{}", role)
    }
}

impl std::str::FromStr for AppRole {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AppRole::Admin),
            "barber" => Ok(AppRole::Barber),
            "user" => Ok(AppRole::User),
            other => Err(RoleError::InvalidRole(other.to_string())),
        }
    }
}

/// A single row of the `user_roles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}

/// A row of `admin_users_view`, which joins auth users with their aggregated
/// grants for the admin screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<AppRole>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

// ==============================================================================
// REQUEST TYPES
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GrantRoleRequest {
    pub role: AppRole,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum RoleError {
    #[error("Role grant not found")]
    NotFound,

    #[error("User already holds this role")]
    DuplicateGrant,

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn staff_covers_admin_and_barber_only() {
        assert!(AppRole::Admin.is_staff());
        assert!(AppRole::Barber.is_staff());
        assert!(!AppRole::User.is_staff());
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [AppRole::Admin, AppRole::Barber, AppRole::User] {
            assert_eq!(AppRole::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            AppRole::from_str("manager"),
            Err(RoleError::InvalidRole(_))
        ));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AppRole::Barber).unwrap(), "\"barber\"");
    }
}
