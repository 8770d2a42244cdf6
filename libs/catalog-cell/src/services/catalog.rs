// libs/catalog-cell/src/services/catalog.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CatalogError, SalonConfig, SalonService, UpdateServicesRequest};

/// Serves and edits the `salon_config` singleton.
pub struct CatalogService {
    supabase: SupabaseClient,
    service_role_key: String,
}

impl CatalogService {
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

    /// The salon configuration row. Reads run with the anon key, same as the
    /// public storefront.
    pub async fn get_config(&self) -> Result<SalonConfig, CatalogError> {
        debug!("Fetching salon configuration");

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/salon_config?limit=1", None, None)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(CatalogError::NotFound)?;

        serde_json::from_value(row).map_err(|e| {
            CatalogError::DatabaseError(format!("Failed to parse salon config: {}", e))
        })
    }

    pub async fn list_services(&self) -> Result<Vec<SalonService>, CatalogError> {
        Ok(self.get_config().await?.services.unwrap_or_default())
    }

    /// Whether `name` exactly matches a configured service. An unprovisioned
    /// catalog offers nothing.
    pub async fn service_exists(&self, name: &str) -> Result<bool, CatalogError> {
        match self.get_config().await {
            Ok(config) => Ok(config
                .services
                .unwrap_or_default()
                .iter()
                .any(|service| service.name == name)),
            Err(CatalogError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Replace the services list wholesale. Names must be unique and
    /// non-empty, durations positive, prices non-negative.
    pub async fn update_services(
        &self,
        request: UpdateServicesRequest,
    ) -> Result<SalonConfig, CatalogError> {
        self.validate_services(&request.services)?;

        let current = self.get_config().await?;

        let update_data = json!({
            "services": request.services,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let path = format!("/rest/v1/salon_config?id=eq.{}", current.id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                self.service_token(),
                Some(update_data),
                Some(headers),
            )
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::DatabaseError("Update returned no row".to_string()))?;

        let updated: SalonConfig = serde_json::from_value(row).map_err(|e| {
            CatalogError::DatabaseError(format!("Failed to parse salon config: {}", e))
        })?;

        info!(
            "Salon services updated ({} services)",
            updated.services.as_ref().map_or(0, |s| s.len())
        );

        Ok(updated)
    }

    fn validate_services(&self, services: &[SalonService]) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();

        for service in services {
            let name = service.name.trim();
            if name.is_empty() {
                return Err(CatalogError::ValidationError(
                    "Service name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(CatalogError::ValidationError(format!(
                    "Duplicate service name: {}",
                    name
                )));
            }
            if service.duration <= 0 {
                return Err(CatalogError::ValidationError(format!(
                    "Service {} must have a positive duration",
                    name
                )));
            }
            if service.price < 0.0 {
                return Err(CatalogError::ValidationError(format!(
                    "Service {} cannot have a negative price",
                    name
                )));
            }
        }

        Ok(())
    }
}
