//! src/error.rs
//! ============================================================================
//! # `ScoutError`: unified error type for listers and search-lets
//!
//! Only configuration problems and search-let failures surface here. Traversal
//! I/O errors and lock-probe failures are logged and absorbed by the lister,
//! and cancellation is reported through `ScanState`, never as an error.

use std::io;
use std::path::PathBuf;

use compact_str::CompactString;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::{Level, event};

/// Convenient alias carrying the crate error type
pub type ScoutResult<T> = Result<T, ScoutError>;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScoutError {
    // ────────────────────────────────────────────────────────────
    // Configuration
    // ────────────────────────────────────────────────────────────
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig {
        field: CompactString,
        message: CompactString,
    },

    #[error("Invalid name filter '{pattern}': {source}")]
    InvalidPattern {
        pattern: CompactString,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid timestamp bound: {0}")]
    InvalidTimeBound(CompactString),

    #[error("Unknown comparator: {0}")]
    UnknownComparator(CompactString),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ────────────────────────────────────────────────────────────
    // Search composition
    // ────────────────────────────────────────────────────────────
    #[error("At least one sub-search must be supplied")]
    MissingSubSearch,

    #[error("Failed to execute search #{index}: {source}")]
    SubSearchFailed {
        index: usize,
        #[source]
        source: Box<ScoutError>,
    },

    #[error("Search task {search} did not complete: {reason}")]
    TaskJoin {
        search: CompactString,
        reason: CompactString,
    },
}

impl ScoutError {
    /// Whether the caller could reasonably fix the input and try again
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::InvalidPattern { .. }
                | Self::InvalidTimeBound(_)
                | Self::UnknownComparator(_)
                | Self::MissingSubSearch
        )
    }

    #[inline]
    #[must_use]
    pub const fn operation_type(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. }
            | Self::InvalidPattern { .. }
            | Self::InvalidTimeBound(_)
            | Self::UnknownComparator(_) => "config_validation",

            Self::Config(_) | Self::ConfigSerialize(_) | Self::ConfigIo { .. } => "config_file",

            Self::MissingSubSearch | Self::SubSearchFailed { .. } | Self::TaskJoin { .. } => {
                "search_operation"
            }
        }
    }

    #[must_use]
    pub fn extract_trace_fields(&self) -> SmallVec<[(&'static str, CompactString); 4]> {
        match self {
            Self::InvalidConfig { field, message } => smallvec![
                ("field", field.clone()),
                ("message", message.clone()),
            ],

            Self::InvalidPattern { pattern, .. } => smallvec![("pattern", pattern.clone())],

            Self::SubSearchFailed { index, .. } => {
                smallvec![("index", CompactString::from(index.to_string()))]
            }

            Self::TaskJoin { search, .. } => smallvec![("search", search.clone())],

            _ => smallvec![],
        }
    }

    /// Emits a single structured `tracing` event and hands the error back.
    #[must_use]
    pub fn trace(self) -> Self {
        let extra: SmallVec<[(&'static str, CompactString); 4]> = self.extract_trace_fields();

        event!(
            Level::ERROR,
            op_type = self.operation_type(),
            error = %self,
            recoverable = self.is_recoverable(),
            extra = ?extra,
        );

        self
    }

    // ────────────────────────────────────────────────────────────
    // Smart constructors
    // ────────────────────────────────────────────────────────────
    #[inline]
    #[must_use]
    pub fn invalid_config(field: &str, message: &str) -> Self {
        Self::InvalidConfig {
            field: CompactString::new(field),
            message: CompactString::new(message),
        }
    }

    #[inline]
    #[must_use]
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: CompactString::new(pattern),
            source,
        }
    }

    #[inline]
    #[must_use]
    pub fn sub_search_failed(index: usize, source: Self) -> Self {
        Self::SubSearchFailed {
            index,
            source: Box::new(source),
        }
    }

    #[inline]
    #[must_use]
    pub fn task_join(search: &str, reason: &str) -> Self {
        Self::TaskJoin {
            search: CompactString::new(search),
            reason: CompactString::new(reason),
        }
    }

    #[inline]
    #[must_use]
    pub fn config_io(path: PathBuf, source: io::Error) -> Self {
        Self::ConfigIo { path, source }
    }
}
