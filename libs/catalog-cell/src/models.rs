// libs/catalog-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// SALON CONFIGURATION
// ==============================================================================

/// The singleton `salon_config` row: branding plus the bookable services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalonConfig {
    pub id: Uuid,
    pub name: String,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<Value>,
    #[serde(default)]
    pub services: Option<Vec<SalonService>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One bookable service; duration is in minutes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalonService {
    pub name: String,
    pub duration: i32,
    pub price: f64,
}

// ==============================================================================
// REQUEST TYPES
// ==============================================================================

/// Wholesale replacement of the services list.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateServicesRequest {
    pub services: Vec<SalonService>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Salon configuration not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
