// libs/scheduling-cell/src/store/supabase.rs
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};

use crate::models::Appointment;
use crate::store::{
    AppointmentFilter, AppointmentPatch, AppointmentStore, NewAppointment, StoreChange, StoreError,
};

/// PostgREST-backed store. Runs on the service role key; caller authorization
/// happens in the handlers before any call lands here, and row-level security
/// stays on in the database as the second fence.
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
    service_role_key: String,
    changes: broadcast::Sender<StoreChange>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            supabase: SupabaseClient::new(config),
            service_role_key: config.supabase_service_role_key.clone(),
            changes,
        }
    }

    fn service_token(&self) -> Option<&str> {
        if self.service_role_key.is_empty() {
            None
        } else {
            Some(self.service_role_key.as_str())
        }
    }

    fn notify(&self) {
        // Nobody listening is fine; the poller catches up on its own.
        let _ = self.changes.send(StoreChange::Appointments);
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn map_error(e: SupabaseError) -> StoreError {
        match e {
            SupabaseError::Conflict(_) => StoreError::ConstraintViolation,
            SupabaseError::NotFound(_) => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }

    fn parse_row(row: Value) -> Result<Appointment, StoreError> {
        serde_json::from_value(row)
            .map_err(|e| StoreError::Unavailable(format!("Failed to parse appointment: {}", e)))
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let now = Utc::now();
        let appointment_data = json!({
            "customer_name": new.customer_name,
            "customer_phone": new.customer_phone,
            "customer_email": new.customer_email,
            "service": new.service,
            "appointment_date": new.appointment_date.format("%Y-%m-%d").to_string(),
            "appointment_time": new.appointment_time.format("%H:%M:%S").to_string(),
            "status": new.status.to_string(),
            "notes": new.notes,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                self.service_token(),
                Some(appointment_data),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(Self::map_error)?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Unavailable("Insert returned no row".to_string()))?;

        let appointment = Self::parse_row(row)?;
        info!("Appointment {} stored", appointment.id);
        self.notify();

        Ok(appointment)
    }

    async fn query(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let mut query_parts = Vec::new();

        if let Some(date) = filter.date {
            query_parts.push(format!("appointment_date=eq.{}", date.format("%Y-%m-%d")));
        }
        if let Some(statuses) = &filter.statuses {
            let list = statuses
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(",");
            query_parts.push(format!("status=in.({})", list));
        }
        query_parts.push("order=appointment_time.asc".to_string());

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        debug!("Querying appointments: {}", path);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, self.service_token(), None)
            .await
            .map_err(Self::map_error)?;

        result.into_iter().map(Self::parse_row).collect()
    }

    async fn fetch(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, self.service_token(), None)
            .await
            .map_err(Self::map_error)?;

        let row = result.into_iter().next().ok_or(StoreError::NotFound)?;
        Self::parse_row(row)
    }

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, StoreError> {
        let mut update_data = serde_json::Map::new();

        if let Some(status) = &patch.status {
            update_data.insert("status".to_string(), json!(status.to_string()));
        }
        if let Some(queue_position) = &patch.queue_position {
            // Some(None) writes SQL NULL and clears the position.
            update_data.insert("queue_position".to_string(), json!(queue_position));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", id);

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                self.service_token(),
                Some(Value::Object(update_data)),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(Self::map_error)?;

        let row = result.into_iter().next().ok_or(StoreError::NotFound)?;
        let appointment = Self::parse_row(row)?;
        self.notify();

        Ok(appointment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                self.service_token(),
                None,
                Some(Self::representation_headers()),
            )
            .await
            .map_err(Self::map_error)?;

        if deleted.is_empty() {
            return Err(StoreError::NotFound);
        }

        self.notify();
        Ok(())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
