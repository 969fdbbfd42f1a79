//! Version identifiers and version-store outcomes.
//!
//! A [`VersionId`] renders as `YYYYMMDDHHMMSS-NNN`: the UTC second the version
//! was stored plus a three-digit disambiguator. The format is fixed-width, so
//! string order equals chronological order, and the disambiguator keeps two
//! uploads landing in the same second apart.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Largest disambiguator before rolling into the next second.
const MAX_SEQ: u16 = 999;

/// Rendered length of a version identifier.
const VERSION_ID_LEN: usize = 18;

/// Identifier of one stored version of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    stamp: NaiveDateTime,
    seq: u16,
}

impl VersionId {
    /// The first identifier for the second containing `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        let naive = at.naive_utc();
        let stamp = naive.with_nanosecond(0).unwrap_or(naive);
        Self { stamp, seq: 0 }
    }

    /// The identifier directly after this one.
    pub fn successor(&self) -> Self {
        if self.seq < MAX_SEQ {
            Self {
                stamp: self.stamp,
                seq: self.seq + 1,
            }
        } else {
            Self {
                stamp: self.stamp + Duration::seconds(1),
                seq: 0,
            }
        }
    }

    /// Pick the identifier for a new version stored at `now`.
    ///
    /// Strictly greater than `latest`, even when the clock has not advanced
    /// a full second or has stepped backwards.
    pub fn next_after(now: DateTime<Utc>, latest: Option<&VersionId>) -> Self {
        let candidate = Self::at(now);
        match latest {
            Some(latest) if *latest >= candidate => latest.successor(),
            _ => candidate,
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.stamp.format("%Y%m%d%H%M%S"), self.seq)
    }
}

impl FromStr for VersionId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid version identifier '{s}'"));

        let bytes = s.as_bytes();
        if bytes.len() != VERSION_ID_LEN || bytes[14] != b'-' {
            return Err(invalid());
        }
        if !bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 14 || b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let field = |range: std::ops::Range<usize>| -> u32 {
            s[range].parse::<u32>().unwrap_or(u32::MAX)
        };

        let stamp = NaiveDate::from_ymd_opt(field(0..4) as i32, field(4..6), field(6..8))
            .and_then(|d| d.and_hms_opt(field(8..10), field(10..12), field(12..14)))
            .ok_or_else(invalid)?;
        let seq = s[15..].parse::<u16>().map_err(|_| invalid())?;

        Ok(Self { stamp, seq })
    }
}

impl TryFrom<String> for VersionId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.to_string()
    }
}

/// Which version a restore asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The greatest retained identifier.
    Latest,
    /// One specific identifier.
    Exact(VersionId),
}

impl VersionSelector {
    /// Interpret an optional client-supplied version.
    ///
    /// Absent, empty, or `latest` select the newest version. A malformed
    /// identifier can never name a stored version and is reported as not found.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Latest),
            Some(s) if s.eq_ignore_ascii_case("latest") => Ok(Self::Latest),
            Some(s) => s
                .parse()
                .map(Self::Exact)
                .map_err(|_| AppError::not_found(format!("Version '{s}' not found"))),
        }
    }
}

/// Result of storing content under a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new version was written.
    Uploaded(VersionId),
    /// A retained version already has this content; nothing was written.
    Duplicate,
}

impl PutOutcome {
    /// The new version, if one was written.
    pub fn version(&self) -> Option<&VersionId> {
        match self {
            Self::Uploaded(v) => Some(v),
            Self::Duplicate => None,
        }
    }

    /// Whether the upload was a no-op.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }
}

/// Content of one restored version.
#[derive(Debug, Clone)]
pub struct RestoredFile {
    /// Sanitized filename the version belongs to.
    pub filename: String,
    /// The version that was read.
    pub version: VersionId,
    /// Raw content.
    pub data: Bytes,
}
