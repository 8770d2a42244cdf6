use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::handlers::{self, AvailabilityQuery, DateQuery};
use scheduling_cell::{
    AppointmentStatus, AppointmentStore, BookAppointmentRequest, Clock, FixedClock,
    MemoryAppointmentStore, SchedulingState, ServiceCatalog, StaticCatalog, UpdateStatusRequest,
};
use shared_models::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn monday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn offline_state() -> SchedulingState {
    state_with_config(TestConfig::default().to_arc())
}

fn state_with_config(config: Arc<shared_config::AppConfig>) -> SchedulingState {
    let store: Arc<dyn AppointmentStore> = Arc::new(MemoryAppointmentStore::new());
    let catalog: Arc<dyn ServiceCatalog> =
        Arc::new(StaticCatalog::new(&["Classic Cut", "Beard Trim"]));
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(monday_morning()));
    SchedulingState::with_parts(config, store, catalog, clock)
}

fn booking(time: (u32, u32)) -> BookAppointmentRequest {
    BookAppointmentRequest {
        customer_name: "Jordan Reyes".to_string(),
        customer_phone: "+1-555-0140".to_string(),
        customer_email: None,
        service: "Classic Cut".to_string(),
        appointment_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        appointment_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
        notes: None,
    }
}

async fn mock_roles(mock_server: &MockServer, user: &TestUser, roles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_roles"))
        .and(query_param("user_id", format!("eq.{}", user.id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockSupabaseResponses::role_rows(&user.id, roles)),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_book_appointment_handler_returns_created() {
    let state = offline_state();

    let (status, Json(body)) =
        handlers::book_appointment(State(state), Json(booking((14, 30))))
            .await
            .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["appointment"]["status"], json!("confirmed"));
    assert_eq!(body["appointment"]["customer_name"], json!("Jordan Reyes"));
}

#[tokio::test]
async fn test_book_appointment_handler_maps_taken_slot_to_conflict() {
    let state = offline_state();

    handlers::book_appointment(State(state.clone()), Json(booking((15, 0))))
        .await
        .unwrap();
    let result = handlers::book_appointment(State(state), Json(booking((15, 0)))).await;

    assert_matches!(result, Err(AppError::Conflict(msg)) if msg.contains("taken-by-existing"));
}

#[tokio::test]
async fn test_book_appointment_handler_maps_bad_request() {
    let state = offline_state();

    let mut request = booking((14, 0));
    request.service = "Perm".to_string();
    let result = handlers::book_appointment(State(state), Json(request)).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_availability_handler_lists_full_grid() {
    let state = offline_state();

    let Json(body) = handlers::day_availability(
        State(state),
        Query(AvailabilityQuery {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(body["bookable"], json!(true));
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 18);
    // Clock reads 10:00, so the first three slots are already gone.
    assert_eq!(slots[0]["state"], json!("past"));
    assert_eq!(slots[2]["state"], json!("past"));
    assert_eq!(slots[3]["state"], json!("free"));
    assert_eq!(slots[17]["state"], json!("free"));
}

#[tokio::test]
async fn test_availability_handler_flags_out_of_window_day() {
    let state = offline_state();

    let Json(body) = handlers::day_availability(
        State(state),
        Query(AvailabilityQuery {
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(body["bookable"], json!(false));
    assert_eq!(body["reason"], json!("outside-window"));
    assert!(body["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_queue_view_handler_starts_empty() {
    let state = offline_state();

    let Json(body) = handlers::queue_view(State(state)).await.unwrap();

    assert!(body["now_serving"].is_null());
    assert!(body["waiting"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_appointments_handler_requires_staff() {
    let mock_server = MockServer::start().await;
    let customer = TestUser::customer("walkin@example.com");
    mock_roles(&mock_server, &customer, &[]).await;

    let state = state_with_config(TestConfig::with_supabase_url(&mock_server.uri()).to_arc());

    let result = handlers::list_appointments(
        State(state),
        Extension(customer.to_user()),
        Query(DateQuery { date: None }),
    )
    .await;

    assert_matches!(result, Err(AppError::Auth(msg)) if msg.contains("Staff"));
}

#[tokio::test]
async fn test_list_appointments_handler_allows_barber() {
    let mock_server = MockServer::start().await;
    let barber = TestUser::barber("sam@aurumsalon.test");
    mock_roles(&mock_server, &barber, &["barber"]).await;

    let state = state_with_config(TestConfig::with_supabase_url(&mock_server.uri()).to_arc());
    handlers::book_appointment(State(state.clone()), Json(booking((11, 0))))
        .await
        .unwrap();

    let Json(body) = handlers::list_appointments(
        State(state),
        Extension(barber.to_user()),
        Query(DateQuery { date: None }),
    )
    .await
    .unwrap();

    assert_eq!(body["total"], json!(1));
    assert_eq!(body["appointments"][0]["customer_name"], json!("Jordan Reyes"));
}

#[tokio::test]
async fn test_update_status_handler_assigns_queue_position() {
    let mock_server = MockServer::start().await;
    let barber = TestUser::barber("sam@aurumsalon.test");
    mock_roles(&mock_server, &barber, &["barber"]).await;

    let state = state_with_config(TestConfig::with_supabase_url(&mock_server.uri()).to_arc());
    let (_, Json(created)) =
        handlers::book_appointment(State(state.clone()), Json(booking((11, 0))))
            .await
            .unwrap();
    let id: Uuid = serde_json::from_value(created["appointment"]["id"].clone()).unwrap();

    let Json(body) = handlers::update_status(
        State(state),
        Extension(barber.to_user()),
        Path(id),
        Json(UpdateStatusRequest {
            status: AppointmentStatus::InQueue,
        }),
    )
    .await
    .unwrap();

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["appointment"]["status"], json!("in-queue"));
    assert_eq!(body["appointment"]["queue_position"], json!(1));
}

#[tokio::test]
async fn test_update_status_handler_maps_invalid_transition_to_conflict() {
    let mock_server = MockServer::start().await;
    let barber = TestUser::barber("sam@aurumsalon.test");
    mock_roles(&mock_server, &barber, &["barber"]).await;

    let state = state_with_config(TestConfig::with_supabase_url(&mock_server.uri()).to_arc());
    let (_, Json(created)) =
        handlers::book_appointment(State(state.clone()), Json(booking((11, 0))))
            .await
            .unwrap();
    let id: Uuid = serde_json::from_value(created["appointment"]["id"].clone()).unwrap();

    handlers::update_status(
        State(state.clone()),
        Extension(barber.to_user()),
        Path(id),
        Json(UpdateStatusRequest {
            status: AppointmentStatus::Cancelled,
        }),
    )
    .await
    .unwrap();

    let result = handlers::update_status(
        State(state),
        Extension(barber.to_user()),
        Path(id),
        Json(UpdateStatusRequest {
            status: AppointmentStatus::InProgress,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn test_get_appointment_handler_maps_missing_to_not_found() {
    let mock_server = MockServer::start().await;
    let barber = TestUser::barber("sam@aurumsalon.test");
    mock_roles(&mock_server, &barber, &["barber"]).await;

    let state = state_with_config(TestConfig::with_supabase_url(&mock_server.uri()).to_arc());

    let result = handlers::get_appointment(
        State(state),
        Extension(barber.to_user()),
        Path(Uuid::new_v4()),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}
