//! `src/fs/file_entry.rs`
//! ============================================================
//! Per-scan file records and the timestamp bounds used to filter them.

use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

// ------------------------------------------------------------
// FileEntry: one accepted listing result.
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path of the entry.
    pub path: PathBuf,

    /// Last-modification timestamp.
    pub modified: DateTime<Utc>,

    pub is_dir: bool,
}

impl FileEntry {
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        // Platforms without mtime support report the epoch.
        let modified: SystemTime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Self {
            path,
            modified: DateTime::<Utc>::from(modified),
            is_dir: metadata.is_dir(),
        }
    }

    /// Base name of the entry, lossily converted.
    #[must_use]
    pub fn name(&self) -> CompactString {
        base_name(&self.path)
    }

    /// Absolute path rendered as a string.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[inline]
#[must_use]
pub fn base_name(path: &Path) -> CompactString {
    path.file_name()
        .map(|name| CompactString::from(name.to_string_lossy()))
        .unwrap_or_default()
}

// ------------------------------------------------------------
// TimeBound: inclusive min/max modification filter value.
// ------------------------------------------------------------

const NEGATIVE_INFINITY: &str = "-INF";
const POSITIVE_INFINITY: &str = "+INF";
const INFINITY: &str = "INF";

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A timestamp bound; `Unbounded` imposes no constraint on either side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeBound {
    #[default]
    Unbounded,

    At(DateTime<Utc>),
}

impl TimeBound {
    #[inline]
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    #[inline]
    #[must_use]
    pub const fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unbounded => None,
            Self::At(at) => Some(*at),
        }
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::At(value)
    }
}

impl FromStr for TimeBound {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed: &str = s.trim();

        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case(NEGATIVE_INFINITY)
            || trimmed.eq_ignore_ascii_case(POSITIVE_INFINITY)
            || trimmed.eq_ignore_ascii_case(INFINITY)
        {
            return Ok(Self::Unbounded);
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::At(parsed.with_timezone(&Utc)));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT) {
            return Ok(Self::At(naive.and_utc()));
        }

        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .ok()
            .and_then(|date: NaiveDate| date.and_hms_opt(0, 0, 0))
            .map(|naive: NaiveDateTime| Self::At(naive.and_utc()))
            .ok_or_else(|| ScoutError::InvalidTimeBound(CompactString::new(trimmed)))
    }
}

impl TryFrom<String> for TimeBound {
    type Error = ScoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeBound> for String {
    fn from(value: TimeBound) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "{INFINITY}"),
            Self::At(at) => write!(f, "{}", at.format(DATE_TIME_FORMAT)),
        }
    }
}
