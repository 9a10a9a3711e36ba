mod common;

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use ::common::types::ContactList;
use ::common::ErrorKind;
use tiletalk_daemon::error::ErrorBody;
use tiletalk_daemon::http_server::auth::IDENTITY_HEADER;
use tiletalk_daemon::http_server::router;

use crate::common::{cast, setup, Cast};

fn app(cast: &Cast) -> Router {
    router(cast.state.clone(), Duration::from_secs(5))
}

fn json_request(method: &str, uri: &str, caller: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(id) = caller {
        builder = builder.header(IDENTITY_HEADER, id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, caller: Option<i64>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(id) = caller {
        builder = builder.header(IDENTITY_HEADER, id.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_is_open() {
    let state = setup().await;
    let app = router(state, Duration::from_secs(5));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v0/identity",
            None,
            json!({"username": "dora"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let identity: Value = body_json(response).await;
    assert_eq!(identity["username"], "dora");
    assert!(identity["id"].is_i64());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v0/identity",
            None,
            json!({"username": "dora"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_grid_routes_require_an_identity() {
    let cast = cast().await;

    let response = app(&cast)
        .oneshot(get("/api/v0/contact", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::AuthenticationRequired);

    // An id nobody registered is no better than none
    let response = app(&cast)
        .oneshot(get("/api/v0/contact", Some(9_999)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&cast)
        .oneshot(get("/api/v0/live", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_contact_and_tile_flow() {
    let cast = cast().await;

    let response = app(&cast)
        .oneshot(json_request(
            "POST",
            "/api/v0/contact/request",
            Some(cast.alice),
            json!({"target_id": cast.bob}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let list: ContactList = body_json(response).await;
    assert_eq!(list.pending, vec![cast.bob]);

    let response = app(&cast)
        .oneshot(json_request(
            "POST",
            "/api/v0/contact/accept",
            Some(cast.bob),
            json!({"requester_id": cast.alice}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list: ContactList = body_json(response).await;
    assert_eq!(list.contacts, vec![cast.alice]);

    let response = app(&cast)
        .oneshot(json_request(
            "POST",
            "/api/v0/tile",
            Some(cast.bob),
            json!({"owner_id": cast.alice, "x_coord": 2, "y_coord": 3, "symbol": "🌵"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/v0/tile?owner_id={}&x_coord=2&y_coord=3", cast.alice);
    let response = app(&cast).oneshot(get(&uri, Some(cast.alice))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tile: Value = body_json(response).await;
    assert_eq!(tile["symbol"], "🌵");
    assert_eq!(tile["starter_id"], cast.bob);

    let response = app(&cast).oneshot(get(&uri, Some(cast.carol))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn test_accept_without_request_is_not_found() {
    let cast = cast().await;

    let response = app(&cast)
        .oneshot(json_request(
            "POST",
            "/api/v0/contact/accept",
            Some(cast.bob),
            json!({"requester_id": cast.alice}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::NotFound);
    assert_eq!(body.message, "contact request not found");
}

#[tokio::test]
async fn test_out_of_bounds_is_bad_request() {
    let cast = cast().await;

    let response = app(&cast)
        .oneshot(json_request(
            "POST",
            "/api/v0/tile",
            Some(cast.alice),
            json!({"owner_id": cast.alice, "x_coord": 4, "y_coord": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::OutOfBounds);
}

#[tokio::test]
async fn test_status_routes() {
    let cast = cast().await;

    let response = app(&cast)
        .oneshot(get("/_status/livez", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&cast)
        .oneshot(get("/_status/readyz", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app(&cast)
        .oneshot(get("/_status/version", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let cast = cast().await;

    let request = Request::builder()
        .uri("/api/v0/nowhere")
        .header("accept", "application/json")
        .body(Body::empty())
        .unwrap();
    let response = app(&cast).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::NotFound);

    let response = app(&cast)
        .oneshot(get("/nowhere", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
