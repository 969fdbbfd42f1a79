//! Upload, check, list, and restore handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;

use asgard_core::error::AppError;
use asgard_service::UploadRequest;

use crate::dto::request::{CheckQuery, RestoreQuery, required};
use crate::dto::response::{CheckResponse, ListResponse, UploadResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Header carrying the identity the client claims to upload as.
pub const USERNAME_HEADER: &str = "username";

/// POST /api/upload: multipart field `file`
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let asserted_user = headers
        .get(USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let mut file: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::validation("File field has no filename"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        file = Some((filename, data));
    }

    let (filename, content) = file.ok_or_else(|| AppError::validation("file is required"))?;

    let outcome = state
        .gateway
        .upload(
            &auth,
            UploadRequest {
                asserted_user,
                filename,
                content,
            },
        )
        .await?;

    Ok(Json(outcome.into()))
}

/// POST /api/check?filename=&filehash=
pub async fn check(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    let filename = required(query.filename, "filename")?;
    let filehash = required(query.filehash, "filehash")?;
    let exists = state.gateway.check(&auth, &filename, &filehash).await?;
    Ok(Json(CheckResponse { exists }))
}

/// GET /api/list
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListResponse>, ApiError> {
    let files = state.gateway.list(&auth).await?;
    Ok(Json(ListResponse { files }))
}

/// POST /api/restore?filename=&version=
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RestoreQuery>,
) -> Result<Response, ApiError> {
    let filename = required(query.filename, "filename")?;
    let restored = state
        .gateway
        .restore(&auth, &filename, query.version.as_deref())
        .await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                restored.filename.replace(['"', '\\'], "_")
            ),
        )
        .header("x-version", restored.version.to_string())
        .header(header::CONTENT_LENGTH, restored.data.len())
        .body(Body::from(restored.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
