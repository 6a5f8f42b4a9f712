//! HTTP API integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::{create_cors_layer, create_router};
use crate::queue::{AdmissionControl, KeySpace};
use crate::store::MemoryStore;

/// Router over a fresh engine. The router is cloneable, so one app serves a
/// whole request sequence against shared state.
fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let admission = Arc::new(AdmissionControl::new(
        store,
        KeySpace::new("user_queue"),
        Duration::from_secs(600),
        Duration::from_secs(10),
    ));
    create_router(admission)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[test]
fn test_create_cors_layer_default() {
    std::env::remove_var("CORS_ALLOW_ORIGIN");
    let _ = create_cors_layer();
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_returns_rank() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/queue?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rank"], 1);
}

#[tokio::test]
async fn test_duplicate_register_conflicts() {
    let app = test_app();

    let first = app
        .clone()
        .oneshot(
            Request::post("/queue?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(
            Request::post("/queue?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["code"], "GQ-0001");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_register_requires_user_id() {
    let app = test_app();
    let response = app
        .oneshot(Request::post("/queue").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_allow_then_allowed_flow() {
    let app = test_app();

    for user in ["u1", "u2"] {
        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/queue?user_id={user}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let before = app
        .clone()
        .oneshot(
            Request::get("/queue/allowed?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(before).await["allowed"], false);

    let allow = app
        .clone()
        .oneshot(
            Request::post("/queue/allow?count=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allow.status(), StatusCode::OK);
    let json = body_json(allow).await;
    assert_eq!(json["request_count"], 1);
    assert_eq!(json["allowed_count"], 1);

    let after = app
        .clone()
        .oneshot(
            Request::get("/queue/allowed?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(after).await["allowed"], true);

    // u1 left the wait queue; u2 moved up.
    let rank_u1 = app
        .clone()
        .oneshot(
            Request::get("/queue/rank?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(rank_u1).await["rank"], -1);

    let rank_u2 = app
        .oneshot(
            Request::get("/queue/rank?user_id=u2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(rank_u2).await["rank"], 1);
}

#[tokio::test]
async fn test_rank_sentinel_for_unknown_user() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::get("/queue/rank?user_id=ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rank"], -1);
}

#[tokio::test]
async fn test_leave_endpoint() {
    let app = test_app();

    let register = app
        .clone()
        .oneshot(
            Request::post("/queue?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(register.status(), StatusCode::OK);

    let leave = app
        .clone()
        .oneshot(json_post(
            "/queue/leave",
            r#"{"queue":"default","user_id":"u1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(leave.status(), StatusCode::OK);

    let rank = app
        .oneshot(
            Request::get("/queue/rank?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(rank).await["rank"], -1);
}

#[tokio::test]
async fn test_heartbeat_endpoint() {
    let app = test_app();

    let response = app
        .oneshot(json_post(
            "/queue/heartbeat",
            r#"{"queue":"default","user_id":"u1"}"#,
        ))
        .await
        .unwrap();
    // 200 even when the wait key does not exist yet.
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_queue_param_defaults_to_default() {
    let app = test_app();

    let register = app
        .clone()
        .oneshot(
            Request::post("/queue?user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(register.status(), StatusCode::OK);

    // Explicitly naming "default" hits the same queue.
    let rank = app
        .oneshot(
            Request::get("/queue/rank?queue=default&user_id=u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(rank).await["rank"], 1);
}
