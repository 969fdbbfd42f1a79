//! HTTP client for a running Asgard server and the local client state file.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use asgard_api::dto::response::{CheckResponse, ListResponse, LoginResponse, UploadResponse};
use asgard_api::error::ApiErrorResponse;
use asgard_core::error::{AppError, ErrorKind};
use asgard_core::types::FileListing;

/// Server used when neither `--server` nor the state file names one.
pub const DEFAULT_SERVER: &str = "http://localhost:8000";

/// File name of the client state in the home directory.
pub const STATE_FILE_NAME: &str = ".asgard_client.json";

/// What `asgard client login` remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    /// Server base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Token from the last login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Username the token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl ClientState {
    /// `~/.asgard_client.json`, or the working directory when no home is set.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(STATE_FILE_NAME)
    }

    /// Read the state file. A missing file is an empty state.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        match tokio::fs::read(path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read client state: {}", path.display()),
                e,
            )),
        }
    }

    /// Write the state file.
    pub async fn save(&self, path: &Path) -> Result<(), AppError> {
        let body = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, body).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write client state: {}", path.display()),
                e,
            )
        })
    }
}

/// Thin wrapper over the `/api` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    client: reqwest::Client,
}

fn transport_error(e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::Internal, format!("Request failed: {e}"), e)
}

/// Turn a non-success response into an `AppError` of the matching kind.
async fn into_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let message = match response.json::<ApiErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => format!("Server answered {status}"),
    };
    let kind = match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
        StatusCode::FORBIDDEN => ErrorKind::Forbidden,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST => ErrorKind::Validation,
        _ => ErrorKind::Internal,
    };
    AppError::new(kind, message)
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(into_error(response).await)
    }
}

impl ApiClient {
    /// Client for the server at `base` (e.g. `http://localhost:8000`).
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    fn url_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Url, AppError> {
        reqwest::Url::parse_with_params(&self.url(path), query)
            .map_err(|e| AppError::validation(format!("Invalid server URL '{}': {e}", self.base)))
    }

    /// `POST /api/login`
    pub async fn login(&self, username: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.url_with_query("login", &[("username", username)])?)
            .send()
            .await
            .map_err(transport_error)?;
        let body: LoginResponse = checked(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(body.token)
    }

    /// `POST /api/check`
    pub async fn check(&self, token: &str, filename: &str, filehash: &str) -> Result<bool, AppError> {
        let response = self
            .client
            .post(self.url_with_query(
                "check",
                &[("filename", filename), ("filehash", filehash)],
            )?)
            .header("x-token", token)
            .send()
            .await
            .map_err(transport_error)?;
        let body: CheckResponse = checked(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(body.exists)
    }

    /// `POST /api/upload`
    pub async fn upload(
        &self,
        token: &str,
        username: &str,
        filename: &str,
        content: Bytes,
    ) -> Result<UploadResponse, AppError> {
        let part = Part::bytes(content.to_vec()).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("upload"))
            .header("x-token", token)
            .header("username", username)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        checked(response)
            .await?
            .json()
            .await
            .map_err(transport_error)
    }

    /// `GET /api/list`
    pub async fn list(&self, token: &str) -> Result<FileListing, AppError> {
        let response = self
            .client
            .get(self.url("list"))
            .header("x-token", token)
            .send()
            .await
            .map_err(transport_error)?;
        let body: ListResponse = checked(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(body.files)
    }

    /// `POST /api/restore`
    pub async fn restore(
        &self,
        token: &str,
        filename: &str,
        version: Option<&str>,
    ) -> Result<Bytes, AppError> {
        let mut query = vec![("filename", filename)];
        if let Some(version) = version {
            query.push(("version", version));
        }

        let response = self
            .client
            .post(self.url_with_query("restore", &query)?)
            .header("x-token", token)
            .send()
            .await
            .map_err(transport_error)?;
        checked(response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)
    }
}
