//! Response DTOs.

use serde::{Deserialize, Serialize};

use asgard_core::types::{FileListing, PutOutcome, VersionId};

/// `POST /api/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for the `X-Token` header.
    pub token: String,
}

/// `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResponse {
    /// A new version was stored.
    Uploaded {
        /// The new version id.
        version: VersionId,
    },
    /// Content matched a retained version; nothing stored.
    Duplicate,
}

impl From<PutOutcome> for UploadResponse {
    fn from(outcome: PutOutcome) -> Self {
        match outcome {
            PutOutcome::Uploaded(version) => Self::Uploaded { version },
            PutOutcome::Duplicate => Self::Duplicate,
        }
    }
}

/// `POST /api/check`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Whether a retained version has the given hash.
    pub exists: bool,
}

/// `GET /api/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    /// Filename to ascending version ids.
    pub files: FileListing,
}

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Storage provider name.
    pub storage: String,
}
