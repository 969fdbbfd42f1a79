//! Client filename sanitization.
//!
//! A client sends whatever path it backed up from (`C:\Users\a\notes.txt`,
//! `/home/a/notes.txt`). Only the final segment names the file on the server,
//! and anything touching a denylisted system location is refused before the
//! store looks at disk.

use std::fmt;

use asgard_core::config::PathPolicyConfig;
use asgard_core::error::AppError;
use asgard_core::result::AppResult;

/// Longest accepted base name in bytes, the common filesystem name limit.
pub const MAX_FILENAME_BYTES: usize = 255;

/// A filename that passed the [`PathPolicy`]. Contains no separators and is
/// never `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SafeFileName(String);

impl SafeFileName {
    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Case-insensitive substring denylist applied to client filenames.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    patterns: Vec<String>,
}

impl PathPolicy {
    /// Build a policy from raw patterns. Blank patterns are ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// Build a policy from configuration.
    pub fn from_config(config: &PathPolicyConfig) -> Self {
        Self::new(&config.blacklist)
    }

    /// Configured patterns, lowercased.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Reduce `raw` to its final path segment and check it against the denylist.
    ///
    /// Plain patterns are matched as substrings of the base name. Patterns
    /// containing `/` name a location and only match whole leading components
    /// of the client path with `\` folded to `/`, so `/etc` catches
    /// `/etc/passwd` but not `/home/a/etc/notes.txt`.
    pub fn sanitize(&self, raw: &str) -> AppResult<SafeFileName> {
        let base = raw
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        if base.is_empty() || base == "." || base == ".." {
            return Err(AppError::unsafe_path(format!(
                "Filename '{raw}' has no usable name"
            )));
        }
        if base.len() > MAX_FILENAME_BYTES {
            return Err(AppError::unsafe_path(format!(
                "Filename exceeds {MAX_FILENAME_BYTES} bytes"
            )));
        }
        if base.chars().any(char::is_control) {
            return Err(AppError::unsafe_path(format!(
                "Filename '{raw}' contains control characters"
            )));
        }

        let lowered_base = base.to_lowercase();
        let lowered_path = raw.trim().replace('\\', "/").to_lowercase();
        if let Some(pattern) = self.patterns.iter().find(|p| {
            if p.contains('/') {
                is_leading_location(&lowered_path, p)
            } else {
                lowered_base.contains(p.as_str())
            }
        }) {
            return Err(AppError::unsafe_path(format!(
                "Filename '{raw}' matches blocked pattern '{pattern}'"
            )));
        }

        Ok(SafeFileName(base.to_string()))
    }
}

/// Whether `path` lies at or below the location `pattern`.
fn is_leading_location(path: &str, pattern: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    match path.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::from_config(&PathPolicyConfig::default())
    }
}
