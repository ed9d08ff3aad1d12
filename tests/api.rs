use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use standup_timer::{
    create_router,
    state::{AppState, MeetingTimer},
    tasks::{history_recorder_task, MeetingHandle},
};

fn setup() -> (Router, Arc<AppState>) {
    let meeting = MeetingHandle::spawn(MeetingTimer::new(5, Vec::<String>::new()), Duration::from_millis(10));
    let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), meeting));
    tokio::spawn(history_recorder_task(Arc::clone(&state), state.meeting.subscribe()));
    (create_router(Arc::clone(&state)), state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn wait_for_history(app: &Router, count: usize) -> Value {
    for _ in 0..200 {
        let (_, body) = call(app, "GET", "/history", None).await;
        if body["meetings"].as_array().map_or(0, Vec::len) >= count {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("history never reached {count} entries");
}

#[tokio::test]
async fn reset_then_start_reports_the_first_speaker() {
    let (app, _) = setup();

    let (status, body) = call(
        &app,
        "POST",
        "/meeting/reset",
        Some(json!({ "length_in_minutes": 6, "speakers": ["A", "B", "C"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["timer"]["seconds_per_speaker"], 120);
    assert_eq!(body["timer"]["seconds_remaining"], 360);

    let (status, body) = call(&app, "POST", "/meeting/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["active_speaker_label"], "Speaker 1: A");

    let (status, body) = call(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["active_speaker"], "A");
    assert_eq!(body["timer"]["running"], true);
    assert_eq!(body["last_action"], "start");
}

#[tokio::test]
async fn skipping_everyone_finishes_and_records_history() {
    let (app, _) = setup();

    call(
        &app,
        "POST",
        "/meeting/reset",
        Some(json!({ "length_in_minutes": 4, "speakers": ["Ana", "Bo"] })),
    )
    .await;
    call(&app, "POST", "/meeting/start", None).await;

    let (_, body) = call(&app, "POST", "/meeting/skip", None).await;
    assert_eq!(body["timer"]["active_speaker"], "Bo");
    assert_eq!(body["timer"]["seconds_elapsed"], 120);

    let (_, body) = call(&app, "POST", "/meeting/skip", None).await;
    assert_eq!(body["status"], "finished");
    assert_eq!(body["timer"]["active_speaker"], Value::Null);
    assert_eq!(body["timer"]["seconds_remaining"], 0);
    assert_eq!(body["timer"]["progress"], 1.0);

    let history = wait_for_history(&app, 1).await;
    let entry = &history["meetings"][0];
    assert_eq!(entry["attendees"], json!(["Ana", "Bo"]));
    assert_eq!(entry["completed_speakers"], 2);
    assert_eq!(entry["finished"], true);
}

#[tokio::test]
async fn stopping_early_records_an_unfinished_meeting() {
    let (app, state) = setup();

    call(
        &app,
        "POST",
        "/meeting/reset",
        Some(json!({ "length_in_minutes": 10, "speakers": [] })),
    )
    .await;
    call(&app, "POST", "/meeting/start", None).await;

    let (status, body) = call(&app, "POST", "/meeting/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["timer"]["speakers"][0]["name"], "Speaker 1");

    // A second stop changes nothing and records nothing
    call(&app, "POST", "/meeting/stop", None).await;

    let history = wait_for_history(&app, 1).await;
    assert_eq!(history["meetings"][0]["finished"], false);
    assert_eq!(state.get_history().unwrap().len(), 1);
}

#[tokio::test]
async fn resetting_a_running_meeting_records_it_as_unfinished() {
    let (app, _) = setup();

    call(
        &app,
        "POST",
        "/meeting/reset",
        Some(json!({ "length_in_minutes": 6, "speakers": ["A", "B", "C"] })),
    )
    .await;
    call(&app, "POST", "/meeting/start", None).await;
    call(&app, "POST", "/meeting/skip", None).await;

    let (status, body) = call(
        &app,
        "POST",
        "/meeting/reset",
        Some(json!({ "length_in_minutes": 6, "speakers": ["X"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["active_speaker"], "X");

    let history = wait_for_history(&app, 1).await;
    let entry = &history["meetings"][0];
    assert_eq!(entry["attendees"], json!(["A", "B", "C"]));
    assert_eq!(entry["completed_speakers"], 1);
    assert_eq!(entry["finished"], false);
}

#[tokio::test]
async fn malformed_reset_is_rejected() {
    let (app, state) = setup();

    let (status, _) = call(&app, "POST", "/meeting/reset", Some(json!({ "speakers": ["A"] }))).await;
    assert!(status.is_client_error());
    assert_eq!(state.meeting.state().length_in_minutes, 5);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup();

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
