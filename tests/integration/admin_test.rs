//! Integration tests for the admin dashboard.

mod helpers;

use http::{StatusCode, header};

use helpers::{TestApp, TestResponse};

/// `name=value` of the session cookie set by a login response.
fn session_cookie(response: &TestResponse) -> String {
    let set_cookie = response
        .header(header::SET_COOKIE.as_str())
        .expect("No Set-Cookie header");
    set_cookie
        .split(';')
        .next()
        .expect("Empty Set-Cookie header")
        .to_string()
}

#[tokio::test]
async fn test_dashboard_redirects_without_session() {
    let app = TestApp::new().await;

    let response = app.get("/admin", None, None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("location"), Some("/admin/login"));
}

#[tokio::test]
async fn test_dashboard_ignores_forged_cookie() {
    let app = TestApp::new().await;

    let response = app.get("/admin", None, Some("asgard_admin=forged")).await;

    assert_eq!(response.status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_login_form_is_served() {
    let app = TestApp::new().await;

    let response = app.get("/admin/login", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("<form"));
}

#[tokio::test]
async fn test_admin_login_sets_cookie_and_redirects() {
    let app = TestApp::new().await;
    app.create_admin("root", "s3cret").await;

    let response = app.admin_login("root", "s3cret").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("location"), Some("/admin"));
    let set_cookie = response.header(header::SET_COOKIE.as_str()).unwrap();
    assert!(set_cookie.starts_with("asgard_admin="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_dashboard_without_tokens() {
    let app = TestApp::new().await;
    app.create_admin("root", "s3cret").await;
    let cookie = session_cookie(&app.admin_login("root", "s3cret").await);

    let response = app.get("/admin", None, Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("No active tokens"));
}

#[tokio::test]
async fn test_dashboard_lists_active_tokens() {
    let app = TestApp::new().await;
    app.create_admin("root", "s3cret").await;
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let cookie = session_cookie(&app.admin_login("root", "s3cret").await);

    let page = app.get("/admin", None, Some(&cookie)).await.text();

    assert!(page.contains(&format!("alice: {alice}")));
    assert!(page.contains(&format!("bob: {bob}")));
    assert!(!page.contains("No active tokens"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    app.create_admin("root", "s3cret").await;

    let response = app.admin_login("root", "guess").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.header(header::SET_COOKIE.as_str()).is_none());

    let response = app.admin_login("nobody", "s3cret").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    app.create_admin("root", "s3cret").await;
    let cookie = session_cookie(&app.admin_login("root", "s3cret").await);

    let response = app.get("/admin/logout", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("location"), Some("/admin/login"));

    let response = app.get("/admin", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FOUND);
}
