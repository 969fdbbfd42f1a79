//! Client login handler.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::{LoginQuery, required};
use crate::dto::response::LoginResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/login?username=
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = required(query.username, "username")?;
    let grant = state.gateway.login(&username).await?;
    Ok(Json(LoginResponse { token: grant.token }))
}
