//! Backup gateway: login, upload, check, list, and restore.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use asgard_auth::TokenStore;
use asgard_core::error::AppError;
use asgard_core::result::AppResult;
use asgard_core::traits::version::VersionRepository;
use asgard_core::types::{
    ContentHash, FileListing, PutOutcome, RestoredFile, Username, VersionSelector,
};

use crate::context::RequestContext;

/// Token issued by a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    /// The user the token belongs to.
    pub user: Username,
    /// Opaque bearer token.
    pub token: String,
}

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Identity the client claims to upload as.
    pub asserted_user: Option<String>,
    /// Filename as sent by the client, possibly with directories.
    pub filename: String,
    /// File content.
    pub content: Bytes,
}

/// Orchestrates the token store and the version repository.
#[derive(Debug, Clone)]
pub struct BackupGateway {
    tokens: Arc<TokenStore>,
    versions: Arc<dyn VersionRepository>,
    max_upload_size_bytes: u64,
}

impl BackupGateway {
    /// Creates a new gateway.
    pub fn new(
        tokens: Arc<TokenStore>,
        versions: Arc<dyn VersionRepository>,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            tokens,
            versions,
            max_upload_size_bytes,
        }
    }

    /// Issue a token for `username` and make sure its namespace exists.
    pub async fn login(&self, username: &str) -> AppResult<LoginGrant> {
        let user = Username::parse(username)?;
        self.versions.ensure_user(&user).await?;
        let token = self.tokens.issue(&user);
        Ok(LoginGrant { user, token })
    }

    /// Resolve a presented token. A missing token is `Unauthorized`.
    pub fn authenticate(&self, token: Option<&str>) -> AppResult<RequestContext> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::unauthorized("Missing token"))?;
        let user = self.tokens.resolve(token)?;
        Ok(RequestContext::new(user))
    }

    /// Store a file for the authenticated user.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        request: UploadRequest,
    ) -> AppResult<PutOutcome> {
        let asserted = request
            .asserted_user
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("Missing username header"))?;
        if asserted != ctx.user.as_str() {
            return Err(AppError::forbidden(format!(
                "Token does not belong to user '{asserted}'"
            )));
        }

        let size = request.content.len() as u64;
        if size > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "Upload of {size} bytes exceeds limit of {} bytes",
                self.max_upload_size_bytes
            )));
        }

        let outcome = self
            .versions
            .put(&ctx.user, &request.filename, request.content)
            .await?;
        debug!(user = %ctx.user, filename = %request.filename, ?outcome, "Upload handled");
        Ok(outcome)
    }

    /// Whether any retained version of `filename` has the given hex hash.
    pub async fn check(
        &self,
        ctx: &RequestContext,
        filename: &str,
        filehash: &str,
    ) -> AppResult<bool> {
        let hash: ContentHash = filehash.parse()?;
        self.versions.has(&ctx.user, filename, &hash).await
    }

    /// All files of the authenticated user and their versions.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<FileListing> {
        self.versions.list(&ctx.user).await
    }

    /// Read one version, the newest when `version` is absent or `latest`.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        filename: &str,
        version: Option<&str>,
    ) -> AppResult<RestoredFile> {
        let selector = VersionSelector::parse(version)?;
        let restored = self.versions.get(&ctx.user, filename, &selector).await?;
        info!(
            user = %ctx.user,
            filename = %restored.filename,
            version = %restored.version,
            "Restore served"
        );
        Ok(restored)
    }

    /// `(username, token)` pairs for the admin dashboard.
    pub fn active_tokens(&self) -> Vec<(Username, String)> {
        self.tokens.active_tokens()
    }
}
