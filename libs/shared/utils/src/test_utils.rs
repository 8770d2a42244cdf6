use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// Config pointed at a wiremock server instead of a real Supabase.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "customer@example.com".to_string(),
            role: "user".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn barber(email: &str) -> Self {
        Self::new(email, "barber")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn customer(email: &str) -> Self {
        Self::new(email, "user")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned PostgREST payloads for wiremock-backed tests, shaped like the
/// salon's Supabase tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_row(
        id: Uuid,
        date: &str,
        time: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "customer_name": "Jordan Reyes",
            "customer_phone": "+1-555-0140",
            "customer_email": "jordan@example.com",
            "service": "Classic Cut",
            "appointment_date": date,
            "appointment_time": time,
            "status": status,
            "queue_position": null,
            "notes": null,
            "created_at": "2024-01-01T09:00:00Z",
            "updated_at": "2024-01-01T09:00:00Z"
        })
    }

    pub fn queued_appointment_row(
        id: Uuid,
        date: &str,
        time: &str,
        queue_position: i32,
    ) -> serde_json::Value {
        let mut row = Self::appointment_row(id, date, time, "in-queue");
        row["queue_position"] = json!(queue_position);
        row
    }

    pub fn salon_config_row() -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "name": "Aurum Salon",
            "tagline": "Walk in golden, walk out platinum",
            "logo_url": null,
            "hero_image_url": null,
            "phone": "+1-555-0100",
            "email": "hello@aurumsalon.test",
            "address": "12 Mercer Street",
            "opening_hours": {"mon-sat": "09:00-18:00"},
            "services": [
                {"name": "Classic Cut", "duration": 30, "price": 35.0},
                {"name": "Beard Trim", "duration": 30, "price": 20.0},
                {"name": "Color & Style", "duration": 30, "price": 80.0}
            ],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn role_rows(user_id: &str, roles: &[&str]) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = roles
            .iter()
            .map(|role| {
                json!({
                    "id": Uuid::new_v4(),
                    "user_id": user_id,
                    "role": role,
                    "created_at": "2024-01-01T00:00:00Z"
                })
            })
            .collect();
        json!(rows)
    }

    pub fn admin_user_row(user_id: &str, email: &str, roles: &[&str]) -> serde_json::Value {
        json!({
            "id": user_id,
            "email": email,
            "name": "Test User",
            "roles": roles,
            "created_at": "2024-01-01T00:00:00Z",
            "last_sign_in_at": "2024-06-01T08:00:00Z"
        })
    }

    pub fn empty_rows() -> serde_json::Value {
        json!([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::barber("sam@aurumsalon.test");
        assert_eq!(user.email, "sam@aurumsalon.test");
        assert_eq!(user.role, "barber");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn queued_row_carries_position() {
        let row = MockSupabaseResponses::queued_appointment_row(
            Uuid::new_v4(),
            "2024-06-03",
            "10:00:00",
            2,
        );
        assert_eq!(row["status"], "in-queue");
        assert_eq!(row["queue_position"], 2);
    }
}
