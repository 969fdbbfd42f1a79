//! Integration tests for token login and the `X-Token` check.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_login_issues_token() {
    let app = helpers::TestApp::new().await;

    let token = app.login("alice").await;

    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_each_login_issues_distinct_token() {
    let app = helpers::TestApp::new().await;

    let first = app.login("alice").await;
    let second = app.login("alice").await;
    assert_ne!(first, second);

    // Both stay valid.
    for token in [&first, &second] {
        let response = app.get("/api/list", Some(token), None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_login_without_username_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app.post("/api/login", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION");
}

#[tokio::test]
async fn test_login_rejects_path_like_username() {
    let app = helpers::TestApp::new().await;

    let response = app.post("/api/login?username=..%2Fetc", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/api/list", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;
    app.login("alice").await;

    let response = app.get("/api/list", Some("deadbeef"), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
    assert_eq!(response.json()["storage"], "memory");
}
