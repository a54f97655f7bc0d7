mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{harness, Harness, START};
use serde_json::{json, Value};
use tower::ServiceExt;
use valve_timer::services::{SettingsStore, DEFAULT_LENGTH_KEY};
use valve_timer::{create_router, tasks::tick, SessionController};

fn router(h: &Harness) -> Router {
    create_router(Arc::new(SessionController::new(Arc::clone(&h.state))))
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Start a session and complete its first fetch
async fn connected(h: &Harness) {
    h.state.resume().unwrap();
    if let Some(fetch) = tick(&h.state).unwrap().fetch {
        fetch.await.unwrap();
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness(|remote| remote);
    let (status, body) = call(router(&h), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_before_first_fetch_is_connecting() {
    let h = harness(|remote| remote);
    h.state.resume().unwrap();

    let (status, body) = call(router(&h), "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valve_name"], "garden");
    assert_eq!(body["default_length_minutes"], 10);
    assert_eq!(body["phase"], "uninitialized");
    assert_eq!(body["presentation"]["state"], "connecting");
    assert_eq!(body["snapshot"], Value::Null);
}

#[tokio::test]
async fn set_timer_with_explicit_length() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START, START);
    connected(&h).await;

    let (status, body) = call(router(&h), "POST", "/timer", Some(json!({ "minutes": "2" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["presentation"]["state"], "on");
    assert_eq!(body["presentation"]["label"], "2:00");
    assert_eq!(h.state.snapshot().unwrap().unwrap().end_epoch(), START + 120);
}

#[tokio::test]
async fn set_timer_defaults_to_saved_length() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START, START);
    h.settings.put_int(DEFAULT_LENGTH_KEY, 3).unwrap();
    connected(&h).await;

    let (status, _) = call(router(&h), "POST", "/timer", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.state.snapshot().unwrap().unwrap().end_epoch(), START + 180);
}

#[tokio::test]
async fn invalid_length_never_reaches_backend() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START, START);
    connected(&h).await;

    for minutes in [json!("abc"), json!(0), json!(-5), json!(""), json!(2.5), json!(true)] {
        let (status, body) = call(router(&h), "POST", "/timer", Some(json!({ "minutes": minutes }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }
    assert_eq!(h.remote.write_count(), 0);
}

#[tokio::test]
async fn timer_write_before_connect_conflicts() {
    let h = harness(|remote| remote);
    h.state.resume().unwrap();

    let (status, _) = call(router(&h), "POST", "/timer/stop", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn stop_turns_valve_off() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START + 600, START);
    connected(&h).await;

    let (status, body) = call(router(&h), "POST", "/timer/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["presentation"]["state"], "off");
}

#[tokio::test]
async fn backend_failure_maps_to_bad_gateway() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START + 600, START);
    connected(&h).await;
    h.remote
        .fail_writes
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let (status, _) = call(router(&h), "POST", "/timer/stop", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(h.state.snapshot().unwrap().unwrap().end_epoch(), START + 600);
}

#[tokio::test]
async fn default_length_is_validated_and_saved() {
    let h = harness(|remote| remote);

    let (status, _) = call(
        router(&h),
        "PUT",
        "/settings/default-length",
        Some(json!({ "minutes": "zero" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.settings.get_int(DEFAULT_LENGTH_KEY, 10), 10);

    let (status, _) = call(
        router(&h),
        "PUT",
        "/settings/default-length",
        Some(json!({ "minutes": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.state.default_length().minutes(), 25);
}

#[tokio::test]
async fn rename_resets_to_connecting() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START + 600, START);
    connected(&h).await;
    assert!(h.state.snapshot().unwrap().is_some());

    let (status, body) = call(router(&h), "PUT", "/settings/name", Some(json!({ "name": "orchard" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["presentation"]["state"], "connecting");
    assert_eq!(h.state.valve_name().unwrap(), "orchard");
    assert_eq!(h.state.snapshot().unwrap(), None);
}

#[tokio::test]
async fn pause_then_resume_restarts_session() {
    let h = harness(|remote| remote);
    h.remote.insert("garden", "r1", START + 600, START);
    let session = Arc::new(SessionController::new(Arc::clone(&h.state)));
    let app = create_router(Arc::clone(&session));

    let (status, _) = call(app.clone(), "POST", "/session/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(session.is_running());

    let (status, body) = call(app.clone(), "POST", "/session/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["presentation"]["state"], "connecting");
    assert!(!session.is_running());
    assert_eq!(h.state.snapshot().unwrap(), None);

    let (status, _) = call(app, "POST", "/timer/stop", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    session.shutdown();
}
