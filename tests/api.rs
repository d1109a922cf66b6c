//! End-to-end tests driving the full router against the in-memory backend.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use scorecast_back::{
    config::AppConfig,
    dao::scoreboard_store::memory::MemoryScoreboardStore,
    routes,
    services::auth_service,
    state::{AppState, SharedState},
};

const TEST_PASSWORD: &str = "password123";

fn test_config() -> AppConfig {
    AppConfig {
        admin_username: "admin".to_owned(),
        admin_password_hash: auth_service::hash_password(TEST_PASSWORD)
            .expect("hash test password"),
        ..AppConfig::default()
    }
}

/// Router backed by a fresh in-memory store.
async fn test_app() -> (SharedState, Router) {
    let state = AppState::new(test_config());
    state
        .install_store(Arc::new(MemoryScoreboardStore::new()))
        .await;
    let router = routes::router(state.clone());
    (state, router)
}

/// Router with no storage backend at all (degraded mode).
fn degraded_app() -> (SharedState, Router) {
    let state = AppState::new(test_config());
    let router = routes::router(state.clone());
    (state, router)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(router: &Router, uri: &str, body: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(request.body(Body::from(body.to_owned())).unwrap())
        .await
        .unwrap()
}

/// Log in with the test credentials and return the session cookie pair.
async fn login(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "username=admin&password={TEST_PASSWORD}"
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin"
    );
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_owned()
}

#[tokio::test]
async fn display_endpoint_serves_the_default_record() {
    let (_state, router) = test_app().await;

    let response = get(&router, "/api/data").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["team1_name"], "India");
    assert_eq!(body["score"], 0);
    assert_eq!(body["wickets"], 0);
    assert_eq!(body["bat1_active"], true);
}

#[tokio::test]
async fn update_without_a_session_is_rejected_and_writes_nothing() {
    let (_state, router) = test_app().await;

    let response = post_json(&router, "/api/update", r#"{"score": 99}"#, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");

    let body = body_json(get(&router, "/api/data").await).await;
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn admin_page_redirects_to_login_without_a_session() {
    let (_state, router) = test_app().await;

    let response = get(&router, "/admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get(header::LOCATION).unwrap();
    assert!(location.to_str().unwrap().starts_with("/login"));
}

#[tokio::test]
async fn wrong_password_does_not_open_a_session() {
    let (_state, router) = test_app().await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=nope"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?error=1"
    );
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn login_update_poll_round_trip() {
    let (_state, router) = test_app().await;
    let cookie = login(&router).await;

    let response = post_json(
        &router,
        "/api/update",
        r#"{"score": 4, "wickets": 1}"#,
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["score"], 4);
    assert_eq!(body["data"]["wickets"], 1);
    assert_eq!(body["data"]["team1_name"], "India");

    let body = body_json(get(&router, "/api/data").await).await;
    assert_eq!(body["score"], 4);
    assert_eq!(body["wickets"], 1);
}

#[tokio::test]
async fn unknown_fields_are_stored_and_served_back() {
    let (_state, router) = test_app().await;
    let cookie = login(&router).await;

    let response = post_json(
        &router,
        "/api/update",
        r#"{"powerplay": true, "score": 12}"#,
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(get(&router, "/api/data").await).await;
    assert_eq!(body["powerplay"], true);
    assert_eq!(body["score"], 12);
}

#[tokio::test]
async fn mistyped_fields_are_rejected_with_the_error_envelope() {
    let (_state, router) = test_app().await;
    let cookie = login(&router).await;

    let response = post_json(
        &router,
        "/api/update",
        r#"{"score": "five"}"#,
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");

    let body = body_json(get(&router, "/api/data").await).await;
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn logo_catalogue_is_served() {
    let (_state, router) = test_app().await;

    let body = body_json(get(&router, "/api/logos").await).await;
    let logos = body.as_array().expect("logo array");
    assert_eq!(logos.len(), 12);
    assert_eq!(logos[0]["label"], "404");
}

#[tokio::test]
async fn degraded_mode_serves_defaults_and_rejects_updates() {
    let (_state, router) = degraded_app();

    let body = body_json(get(&router, "/api/data").await).await;
    assert_eq!(body["score"], 0);
    assert_eq!(body["team2_name"], "Australia");

    let cookie = login(&router).await;
    let response = post_json(&router, "/api/update", r#"{"score": 1}"#, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");

    let body = body_json(get(&router, "/healthcheck").await).await;
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn healthcheck_reports_ok_with_a_store_installed() {
    let (_state, router) = test_app().await;

    let body = body_json(get(&router, "/healthcheck").await).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (_state, router) = test_app().await;
    let cookie = login(&router).await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_json(&router, "/api/update", r#"{"score": 7}"#, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_pages_render_without_a_session() {
    let (_state, router) = test_app().await;

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    // The current record is embedded for the first paint.
    assert!(page.contains("\"team1_name\":\"India\""));
    assert!(!page.contains("__INITIAL_STATE__"));

    let response = get(&router, "/login").await;
    assert_eq!(response.status(), StatusCode::OK);
}
