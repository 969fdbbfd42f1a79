//! `AuthUser` extractor: resolves the `X-Token` header to a request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use asgard_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the client token.
pub const TOKEN_HEADER: &str = "x-token";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        let ctx = state.gateway.authenticate(token)?;
        Ok(AuthUser(ctx))
    }
}
