//! Username newtype.
//!
//! A username doubles as the name of the user's storage namespace, so it
//! must be a single, non-traversing path segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted username, in bytes.
const MAX_USERNAME_LEN: usize = 128;

/// A validated username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }
        if name.len() > MAX_USERNAME_LEN {
            return Err(AppError::validation(format!(
                "Username exceeds {MAX_USERNAME_LEN} bytes"
            )));
        }
        if name == "." || name == ".." {
            return Err(AppError::validation("Username must not be '.' or '..'"));
        }
        if name
            .chars()
            .any(|c| c == '/' || c == '\\' || c == ':' || c.is_control())
        {
            return Err(AppError::validation(format!(
                "Username '{name}' contains path or control characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Borrow the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
