//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use asgard_api::AppState;
use asgard_core::config::{AppConfig, StorageProviderKind};

/// Multipart boundary used by [`TestApp::upload`].
const BOUNDARY: &str = "asgard-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for looking behind the HTTP surface
    pub state: AppState,
    /// Holds the admin credential file for the lifetime of the test
    _tmp: TempDir,
}

impl TestApp {
    /// Create a new test application backed by in-memory storage
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.provider = StorageProviderKind::Memory;
        config.storage.data_root = tmp.path().join("data").to_string_lossy().into_owned();
        config.auth.admin_credentials_path =
            tmp.path().join("admins.json").to_string_lossy().into_owned();
        adjust(&mut config);

        let state = asgard_api::build_state(config)
            .await
            .expect("Failed to build state");
        let router = asgard_api::build_app(state.clone());

        Self {
            router,
            state,
            _tmp: tmp,
        }
    }

    /// Store an administrator credential
    pub async fn create_admin(&self, username: &str, password: &str) {
        self.state
            .admins
            .create_admin(username, password)
            .await
            .expect("Failed to create admin");
    }

    /// Login and return the issued token
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .send(
                Request::post(format!("/api/login?username={username}"))
                    .body(Body::empty())
                    .expect("Failed to build request"),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.json()
        );

        response.json()["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// POST with query string only
    pub async fn post(&self, path_and_query: &str, token: Option<&str>) -> TestResponse {
        let mut req = Request::post(path_and_query);
        if let Some(token) = token {
            req = req.header("x-token", token);
        }
        self.send(req.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// GET with optional token and cookie
    pub async fn get(&self, path: &str, token: Option<&str>, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::get(path);
        if let Some(token) = token {
            req = req.header("x-token", token);
        }
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// Multipart upload of `content` as `filename`
    pub async fn upload(
        &self,
        token: Option<&str>,
        username: Option<&str>,
        filename: &str,
        content: &[u8],
    ) -> TestResponse {
        let mut req = Request::post("/api/upload").header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            req = req.header("x-token", token);
        }
        if let Some(username) = username {
            req = req.header("username", username);
        }

        self.send(
            req.body(Body::from(multipart_body(filename, content)))
                .expect("Failed to build request"),
        )
        .await
    }

    /// Submit the admin login form
    pub async fn admin_login(&self, username: &str, password: &str) -> TestResponse {
        let form = format!("username={username}&password={password}");
        self.send(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .expect("Failed to build request"),
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A single-part `multipart/form-data` body with field `file`.
pub fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(data))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON, `Null` when it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// A header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
