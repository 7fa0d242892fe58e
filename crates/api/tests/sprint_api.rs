//! HTTP-level integration tests for the `/sprints` endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router,
//! with the in-memory store and a scripted generator behind it. Broadcast
//! wiring is verified by subscribing to the channel before each call.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, post_json};
use daybreak_db::{ProgressStore, RunStatus};
use daybreak_events::SprintEvent;
use daybreak_llm::testing::{
    day_replies, email_reply, lesson_reply_titled, plan_json, plan_reply, Scripted,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn intake_json(days: u32) -> serde_json::Value {
    json!({
        "creatorName": "Asha",
        "creatorEmail": "asha@example.com",
        "title": "Morning Momentum",
        "description": "Build a sustainable morning routine.",
        "durationDays": days,
    })
}

fn drain_kinds(rx: &mut tokio::sync::broadcast::Receiver<SprintEvent>) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.kind());
    }
    kinds
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/master-plan returns the generated structure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn master_plan_returns_the_generated_structure() {
    let test = build_test_app([Scripted::Reply(plan_reply(7))]);
    let mut rx = test.registry.subscribe("sprint-wiz-progress").await;

    let response = post_json(
        test.app.clone(),
        "/api/v1/sprints/master-plan",
        json!({
            "formData": intake_json(7),
            "channelName": "sprint-wiz-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let days = body["data"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["theme"], "Theme 1");
    assert_eq!(days[6]["day"], 7);

    // The channel narrates the structure phase.
    assert_eq!(
        drain_kinds(&mut rx),
        vec!["structure-generation-started", "structure-generated"]
    );
    assert_eq!(test.generator.remaining(), 0);
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/master-plan rejects a duration off the whitelist
// ---------------------------------------------------------------------------

#[tokio::test]
async fn master_plan_rejects_a_bad_duration() {
    let test = build_test_app([]);

    let response = post_json(
        test.app,
        "/api/v1/sprints/master-plan",
        json!({
            "formData": intake_json(10),
            "channelName": "sprint-wiz-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("durationDays"));
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/master-plan surfaces an upstream refusal as 502
// ---------------------------------------------------------------------------

#[tokio::test]
async fn master_plan_surfaces_upstream_failure() {
    let test = build_test_app([Scripted::Refuse(500)]);

    let response = post_json(
        test.app,
        "/api/v1/sprints/master-plan",
        json!({
            "formData": intake_json(7),
            "channelName": "sprint-wiz-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "GENERATION_FAILED");
    assert!(body["details"].is_string());
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/generate acknowledges, then completes in background
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_acknowledges_and_completes_in_background() {
    let test = build_test_app(day_replies(1..=7));

    let response = post_json(
        test.app.clone(),
        "/api/v1/sprints/generate",
        json!({
            "sprintId": "sp-1",
            "formData": intake_json(7),
            "masterPlan": plan_json(7),
            "channelName": "sprint-sp-1-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["sprintId"], "sp-1");
    assert_eq!(body["data"]["channelName"], "sprint-sp-1-progress");
    let progress_id = body["data"]["progressId"].as_i64().unwrap();

    // The detached driver owns the run now; wait for it to finish.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let run = test.store.find(progress_id).await.unwrap();
        if run.status == RunStatus::Completed {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "run did not complete, status: {}",
            run.status.label()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let days = test.store.list_days(progress_id).await.unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(test.generator.remaining(), 0);
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/generate fills in sprint id and channel name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_defaults_ids_when_omitted() {
    let test = build_test_app(day_replies(1..=7));

    let response = post_json(
        test.app.clone(),
        "/api/v1/sprints/generate",
        json!({
            "formData": intake_json(7),
            "masterPlan": plan_json(7),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = body_json(response).await;
    let sprint_id = body["data"]["sprintId"].as_str().unwrap();
    assert_eq!(sprint_id.len(), 36, "default sprint id should be a UUID");
    assert_eq!(
        body["data"]["channelName"].as_str().unwrap(),
        format!("sprint-{sprint_id}-progress")
    );
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/generate rejects a plan shorter than the intake
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_requires_matching_plan_length() {
    let test = build_test_app([]);

    let response = post_json(
        test.app.clone(),
        "/api/v1/sprints/generate",
        json!({
            "formData": intake_json(7),
            "masterPlan": plan_json(5),
            "channelName": "sprint-x-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("5 days"));

    // Nothing was persisted.
    assert!(test.store.find(1).await.is_err());
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/regenerate-day returns bare artifacts and broadcasts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_day_returns_bare_artifacts() {
    let test = build_test_app([
        Scripted::Reply(lesson_reply_titled(3, "Redone")),
        Scripted::Reply(email_reply(3)),
    ]);
    let mut rx = test.registry.subscribe("sprint-sp-9-progress").await;

    let response = post_json(
        test.app.clone(),
        "/api/v1/sprints/regenerate-day",
        json!({
            "regenerateDay": 3,
            "formData": intake_json(7),
            "masterPlan": plan_json(7),
            "channelName": "sprint-sp-9-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    // Contract shape: {day, lesson, email} with no envelope.
    let body = body_json(response).await;
    assert_eq!(body["day"], 3);
    assert_eq!(body["lesson"]["title"], "Redone");
    assert_eq!(body["email"]["subject"], "Day 3 is ready");

    assert_eq!(drain_kinds(&mut rx), vec!["lesson-generated"]);

    // Regeneration never touches the store.
    assert!(test.store.find(1).await.is_err());
}

// ---------------------------------------------------------------------------
// Test: POST /sprints/regenerate-day rejects a day outside the plan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_day_outside_the_plan_is_rejected() {
    let test = build_test_app([]);

    let response = post_json(
        test.app,
        "/api/v1/sprints/regenerate-day",
        json!({
            "regenerateDay": 9,
            "formData": intake_json(7),
            "masterPlan": plan_json(7),
            "channelName": "sprint-sp-9-progress",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("day 9"));
}
