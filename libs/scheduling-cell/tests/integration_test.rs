use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::router::scheduling_routes;
use scheduling_cell::{
    AppointmentStore, Clock, FixedClock, MemoryAppointmentStore, SchedulingState, ServiceCatalog,
    StaticCatalog,
};
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn monday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn test_state(supabase_url: Option<&str>) -> SchedulingState {
    let config = match supabase_url {
        Some(url) => TestConfig::with_supabase_url(url).to_arc(),
        None => TestConfig::default().to_arc(),
    };
    let store: Arc<dyn AppointmentStore> = Arc::new(MemoryAppointmentStore::new());
    let catalog: Arc<dyn ServiceCatalog> =
        Arc::new(StaticCatalog::new(&["Classic Cut", "Beard Trim"]));
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(monday_morning()));
    SchedulingState::with_parts(config, store, catalog, clock)
}

fn create_test_app(state: SchedulingState) -> Router {
    scheduling_routes(state)
}

fn booking_body(time: &str) -> Value {
    json!({
        "customer_name": "Jordan Reyes",
        "customer_phone": "+1-555-0140",
        "customer_email": null,
        "service": "Classic Cut",
        "appointment_date": "2024-06-03",
        "appointment_time": time,
        "notes": null
    })
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
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
async fn test_public_booking_returns_created() {
    let app = create_test_app(test_state(None));

    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("content-type", "application/json")
        .body(Body::from(booking_body("14:30:00").to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["appointment"]["status"], json!("confirmed"));
}

#[tokio::test]
async fn test_double_booking_returns_conflict() {
    let state = test_state(None);

    let first = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("content-type", "application/json")
        .body(Body::from(booking_body("15:00:00").to_string()))
        .unwrap();
    let response = create_test_app(state.clone()).oneshot(first).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let second = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("content-type", "application/json")
        .body(Body::from(booking_body("15:00:00").to_string()))
        .unwrap();
    let response = create_test_app(state).oneshot(second).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_past_slot_returns_conflict() {
    let app = create_test_app(test_state(None));

    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("content-type", "application/json")
        .body(Body::from(booking_body("09:00:00").to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_availability_is_public() {
    let app = create_test_app(test_state(None));

    let request = Request::builder()
        .method("GET")
        .uri("/availability?date=2024-06-04")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["bookable"], json!(true));
    assert_eq!(body["slots"].as_array().unwrap().len(), 18);
}

#[tokio::test]
async fn test_queue_display_is_public() {
    let app = create_test_app(test_state(None));

    let request = Request::builder()
        .method("GET")
        .uri("/queue")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["waiting"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_management_routes_require_token() {
    let state = test_state(None);

    let test_cases = vec![
        ("GET", "/appointments"),
        ("GET", "/appointments/5d3adfa6-6e29-4eb3-9a45-0d8a6c07ab43"),
        ("DELETE", "/appointments/5d3adfa6-6e29-4eb3-9a45-0d8a6c07ab43"),
        ("PATCH", "/appointments/5d3adfa6-6e29-4eb3-9a45-0d8a6c07ab43/status"),
        ("POST", "/appointments/5d3adfa6-6e29-4eb3-9a45-0d8a6c07ab43/queue"),
    ];

    for (http_method, uri) in test_cases {
        let request = Request::builder()
            .method(http_method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = create_test_app(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Failed for {} {}",
            http_method,
            uri
        );
    }
}

#[tokio::test]
async fn test_barber_can_list_and_queue_appointments() {
    let mock_server = MockServer::start().await;
    let barber = TestUser::barber("sam@aurumsalon.test");
    mock_roles(&mock_server, &barber, &["barber"]).await;

    let state = test_state(Some(&mock_server.uri()));
    let token = JwtTestUtils::create_test_token(
        &barber,
        "test-secret-key-for-jwt-validation-must-be-long-enough",
        Some(24),
    );

    // Customer books from the public site.
    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("content-type", "application/json")
        .body(Body::from(booking_body("11:00:00").to_string()))
        .unwrap();
    let response = create_test_app(state.clone()).oneshot(request).await.unwrap();
    let created = json_body(response).await;
    let id = created["appointment"]["id"].as_str().unwrap().to_string();

    // Front desk lists the day.
    let request = Request::builder()
        .method("GET")
        .uri("/appointments?date=2024-06-03")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed["total"], json!(1));

    // Customer walks in and gets checked into the queue.
    let request = Request::builder()
        .method("POST")
        .uri(&format!("/appointments/{}/queue", id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let queued = json_body(response).await;
    assert_eq!(queued["appointment"]["queue_position"], json!(1));

    // The public queue shows them after a refresh.
    state.queue_view.refresh().await.unwrap();
    let request = Request::builder()
        .method("GET")
        .uri("/queue")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(state).oneshot(request).await.unwrap();
    let queue = json_body(response).await;
    assert_eq!(queue["waiting"][0]["customer_name"], json!("Jordan Reyes"));
}

#[tokio::test]
async fn test_customer_without_grant_is_refused_management() {
    let mock_server = MockServer::start().await;
    let customer = TestUser::customer("walkin@example.com");
    mock_roles(&mock_server, &customer, &[]).await;

    let state = test_state(Some(&mock_server.uri()));
    let token = JwtTestUtils::create_test_token(
        &customer,
        "test-secret-key-for-jwt-validation-must-be-long-enough",
        Some(24),
    );

    let request = Request::builder()
        .method("GET")
        .uri("/appointments")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_refused() {
    let app = create_test_app(test_state(None));

    let request = Request::builder()
        .method("GET")
        .uri("/appointments")
        .header("authorization", "Bearer invalid.token.here")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
