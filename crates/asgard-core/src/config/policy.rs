//! Retention and filename policy configuration.

use serde::{Deserialize, Serialize};

/// Number of versions kept per file unless configured otherwise.
pub const DEFAULT_MAX_VERSIONS: usize = 4;

/// Version retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Upper bound on retained versions per file; oldest are evicted first.
    #[serde(default = "default_max_versions")]
    pub max_versions: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_versions: default_max_versions(),
        }
    }
}

/// Filename denylist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPolicyConfig {
    /// Case-insensitive substrings that make a filename unsafe.
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
}

impl Default for PathPolicyConfig {
    fn default() -> Self {
        Self {
            blacklist: default_blacklist(),
        }
    }
}

fn default_max_versions() -> usize {
    DEFAULT_MAX_VERSIONS
}

fn default_blacklist() -> Vec<String> {
    [
        "windows",
        "system32",
        "program files",
        "programdata",
        "$recycle.bin",
        "recycler",
        "system volume information",
        "/etc",
        "/proc",
        "/sys",
        "/dev",
        "/boot",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
