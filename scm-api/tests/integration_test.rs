use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use axum::Router;
use scm_api::{app, AppState};
use scm_core::repository::{BookingRepository, SettingsRepository};
use scm_dispatch::{DispatchOptions, DispatchService, ScriptedGateway};
use scm_store::app_config::{EnhancerConfig, MessagingConfig};
use futures_util::StreamExt;
use scm_shared::{ChangeEvent, RecordChange};
use scm_store::{events, ChangeSender, GeminiEnhancer, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower::ServiceExt;

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    gateway: Arc<ScriptedGateway>,
    changes: ChangeSender,
}

fn harness_with(gateway: ScriptedGateway) -> Harness {
    let changes = events::channel();
    let store = Arc::new(MemoryStore::new(changes.clone()));
    let gateway = Arc::new(gateway);
    let dispatch = Arc::new(DispatchService::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        DispatchOptions::default(),
    ));
    let messaging = MessagingConfig {
        endpoint: "https://api.fonnte.com/send".to_string(),
        token: "fonnte-secret-7731".to_string(),
        target: "group-ops".to_string(),
        country_code: "62".to_string(),
        sender: "SCM Bot".to_string(),
    };

    let state = AppState {
        dispatch,
        enhancer: Arc::new(GeminiEnhancer::new(EnhancerConfig::default())),
        settings: store.clone(),
        messaging: Arc::new(RwLock::new(messaging)),
        changes: changes.clone(),
        store_kind: "memory",
    };

    Harness {
        app: app(state),
        store,
        gateway,
        changes,
    }
}

fn harness() -> Harness {
    harness_with(ScriptedGateway::new())
}

impl Harness {
    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_stream(&self) -> BodyDataStream {
        let request = Request::builder()
            .method("GET")
            .uri("/v1/stream")
            .body(Body::empty())
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.into_body().into_data_stream()
    }

    async fn create(&self, unit: &str, date: &str, start: &str, end: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/v1/bookings",
            Some(json!({
                "unit": unit,
                "details": "Lift transformer at Bay 3",
                "date": date,
                "start_time": start,
                "end_time": end,
            })),
        )
        .await
    }
}

#[tokio::test]
async fn test_form_submission_books_and_announces() {
    let h = harness();

    let (status, body) = h.create("Crane", "2024-05-20", "08:00", "12:00").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "REQ-00001");
    assert_eq!(body["data"]["status"], "Requested");
    assert_eq!(body["data"]["unit"], "Crane");
    assert!(body.get("warning").is_none());

    let sent = h.gateway.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("REQ-00001"));
    assert!(sent[0].contains("08:00 - 12:00"));

    let (_, list) = h.call("GET", "/v1/bookings", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_fields_are_rejected_before_the_store() {
    let h = harness();

    let (status, body) = h
        .call("POST", "/v1/bookings", Some(json!({ "unit": "Crane", "date": "2024-05-20" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("details"));
    assert!(h.store.list_bookings().await.unwrap().is_empty());
    assert!(h.gateway.sent().await.is_empty());
}

#[tokio::test]
async fn test_gateway_failure_is_a_warning() {
    let h = harness_with(ScriptedGateway::failing("device not connected"));

    let (status, body) = h.create("Picker", "2024-05-20", "09:00", "10:00").await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["warning"].as_str().unwrap().contains("device not connected"));
    assert_eq!(h.store.list_bookings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_close_command() {
    let h = harness();
    h.create("Crane", "2024-05-20", "08:00", "12:00").await;
    let (_, before) = h.call("GET", "/v1/notifications", None).await;
    let before = before.as_array().unwrap().len();

    let (status, reply) = h
        .call("POST", "/v1/chat", Some(json!({ "message": "/CLOSE REQ-0001" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    let produced = reply["data"].as_array().unwrap();
    assert_eq!(produced.len(), 2);
    assert_eq!(produced[0]["request_id"], "USER-CHAT");
    assert_eq!(produced[1]["request_id"], "REQ-00001");

    let (_, booking) = h.call("GET", "/v1/bookings/REQ-00001", None).await;
    assert_eq!(booking["status"], "Close");

    let (_, after) = h.call("GET", "/v1/notifications", None).await;
    assert_eq!(after.as_array().unwrap().len(), before + 2);
}

#[tokio::test]
async fn test_chat_unknown_target_reports_error() {
    let h = harness();
    h.create("Crane", "2024-05-20", "08:00", "12:00").await;

    let (status, reply) = h
        .call("POST", "/v1/chat", Some(json!({ "message": "/CLOSE REQ-00077" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    let produced = reply["data"].as_array().unwrap();
    assert_eq!(produced.len(), 2);
    assert_eq!(produced[1]["request_id"], "ERROR");

    let (_, booking) = h.call("GET", "/v1/bookings/REQ-00001", None).await;
    assert_eq!(booking["status"], "Requested");
}

#[tokio::test]
async fn test_deleted_identifier_is_reused() {
    let h = harness();
    for hour in 1..=4 {
        let start = format!("{:02}:00", hour);
        let end = format!("{:02}:30", hour);
        h.create("Primemover", "2024-05-20", &start, &end).await;
    }

    let (status, _) = h.call("DELETE", "/v1/bookings/REQ-00003", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = h.create("Primemover", "2024-05-21", "08:00", "09:00").await;
    assert_eq!(body["data"]["id"], "REQ-00003");
}

#[tokio::test]
async fn test_status_control_and_closed_delete() {
    let h = harness();
    h.create("Foco Crane", "2024-05-20", "08:00", "12:00").await;

    let (status, body) = h
        .call("PUT", "/v1/bookings/REQ-00001/status", Some(json!({ "status": "On Progress" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "On Progress");

    h.call("PUT", "/v1/bookings/REQ-00001/status", Some(json!({ "status": "Close" })))
        .await;
    let (status, _) = h.call("DELETE", "/v1/bookings/REQ-00001", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .call("PUT", "/v1/bookings/REQ-00001/status", Some(json!({ "status": "Finished" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_booking_is_404() {
    let h = harness();
    let (status, body) = h.call("GET", "/v1/bookings/REQ-00042", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_dashboard_and_schedule() {
    let h = harness();
    h.create("Crane", "2024-05-20", "12:00", "18:00").await;
    h.create("Picker", "2024-05-20", "06:00", "12:00").await;
    h.create("Picker", "2024-05-21", "06:00", "07:00").await;
    h.call("PUT", "/v1/bookings/REQ-00002/status", Some(json!({ "status": "Pending" })))
        .await;

    let (_, dashboard) = h.call("GET", "/v1/dashboard", None).await;
    assert_eq!(dashboard["total"], 3);
    assert_eq!(dashboard["counts"][0]["status"], "Requested");
    assert_eq!(dashboard["counts"][0]["count"], 2);
    assert_eq!(dashboard["counts"][2]["count"], 1);

    let (status, schedule) = h.call("GET", "/v1/schedule?date=2024-05-20", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = schedule["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["booking"]["id"], "REQ-00002");
    assert_eq!(entries[0]["start_pct"], 25.0);
    assert_eq!(entries[1]["end_pct"], 75.0);
    assert!(schedule["now_pct"].is_null());

    let (status, _) = h.call("GET", "/v1/schedule?date=20-05-2024", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_mask_and_persist() {
    let h = harness();

    let (_, settings) = h.call("GET", "/v1/settings", None).await;
    assert_eq!(settings["messaging"]["token"], "****7731");
    assert_eq!(settings["messaging"]["configured"], true);
    assert_eq!(settings["store"], "memory");

    let (status, updated) = h
        .call(
            "PUT",
            "/v1/settings/messaging",
            Some(json!({ "token": " new-token-9090 ", "target": "group-night" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["token"], "****9090");
    assert_eq!(updated["target"], "group-night");

    let stored = h.store.load_settings().await.unwrap();
    assert_eq!(stored.get("messaging.token").map(String::as_str), Some("new-token-9090"));
}

#[tokio::test]
async fn test_connection_checks() {
    let h = harness();

    let (status, body) = h.call("POST", "/v1/settings/messaging/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = h.call("POST", "/v1/settings/database/test", None).await;
    assert_eq!(status, StatusCode::OK);

    h.store.set_reachable(false);
    let (status, body) = h.call("POST", "/v1/settings/database/test", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["hint"].as_str().is_some());

    let (status, _) = h.call("POST", "/v1/bookings/refresh", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_enhance_without_key_echoes_details() {
    let h = harness();
    let (status, body) = h
        .call("POST", "/v1/bookings/enhance", Some(json!({ "details": "angkat trafo" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"], "angkat trafo");
}

async fn next_frame(stream: &mut BodyDataStream) -> String {
    let chunk = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    String::from_utf8(chunk.to_vec()).unwrap()
}

#[tokio::test]
async fn test_stream_pushes_created_booking() {
    let h = harness();
    let mut stream = h.open_stream().await;

    h.create("Crane", "2024-05-20", "08:00", "12:00").await;

    let frame = next_frame(&mut stream).await;
    assert!(frame.contains("event: bookings.insert"));
    assert!(frame.contains("REQ-00001"));
}

#[tokio::test]
async fn test_stream_tells_lagging_client_to_resync() {
    let h = harness();
    let mut stream = h.open_stream().await;

    for _ in 0..300 {
        h.changes
            .send(ChangeEvent::Bookings(RecordChange::Delete("REQ-09999".to_string())))
            .unwrap();
    }

    let frame = next_frame(&mut stream).await;
    assert!(frame.contains("event: resync"));
}
