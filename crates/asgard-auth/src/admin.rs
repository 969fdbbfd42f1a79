//! Administrator credential file.
//!
//! A JSON object mapping admin usernames to Argon2id PHC strings. The file
//! is re-read on every check so admins created with `asgard create-admin`
//! while the server runs can log in right away.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use asgard_core::error::{AppError, ErrorKind};
use asgard_core::result::AppResult;
use asgard_core::types::Username;

use crate::password::PasswordHasher;

type Credentials = BTreeMap<String, String>;

/// Reads and writes the administrator credential file.
#[derive(Debug)]
pub struct AdminCredentialStore {
    path: PathBuf,
    hasher: PasswordHasher,
    write_lock: Mutex<()>,
}

impl AdminCredentialStore {
    /// Use the credential file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hasher: PasswordHasher::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> AppResult<Credentials> {
        match fs::read(&self.path).await {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Ok(Credentials::new()),
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Credentials::new()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read admin credentials: {}", self.path.display()),
                e,
            )),
        }
    }

    async fn save(&self, credentials: &Credentials) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(credentials)?;
        let temp = self.path.with_extension("json.partial");
        fs::write(&temp, body).await?;
        fs::rename(&temp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write admin credentials: {}", self.path.display()),
                e,
            )
        })
    }

    /// Store a new administrator. Existing usernames are rejected.
    pub async fn create_admin(&self, username: &str, password: &str) -> AppResult<Username> {
        let admin = Username::parse(username)?;
        if password.is_empty() {
            return Err(AppError::validation("Admin password must not be empty"));
        }

        let _guard = self.write_lock.lock().await;
        let mut credentials = self.load().await?;
        if credentials.contains_key(admin.as_str()) {
            return Err(AppError::validation(format!(
                "Admin '{admin}' already exists"
            )));
        }

        let hash = self.hasher.hash_password(password)?;
        credentials.insert(admin.to_string(), hash);
        self.save(&credentials).await?;

        info!(admin = %admin, path = %self.path.display(), "Admin created");
        Ok(admin)
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both yield `Unauthorized`.
    pub async fn verify(&self, username: &str, password: &str) -> AppResult<Username> {
        let denied = || AppError::unauthorized("Invalid admin credentials");

        let admin = Username::parse(username).map_err(|_| denied())?;
        let credentials = self.load().await?;
        let Some(hash) = credentials.get(admin.as_str()) else {
            warn!(admin = %admin, "Admin login for unknown user");
            return Err(denied());
        };

        if self.hasher.verify_password(password, hash)? {
            Ok(admin)
        } else {
            warn!(admin = %admin, "Admin login with wrong password");
            Err(denied())
        }
    }

    /// Configured admin usernames.
    pub async fn admins(&self) -> AppResult<Vec<String>> {
        Ok(self.load().await?.into_keys().collect())
    }
}
