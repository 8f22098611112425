//! ``src/fs/dir_lister.rs``
//!
//! # `DirectoryLister`: filtered, sorted, capped recursive listings
//!
//! A lister owns a [`ListingConfig`] and performs a fresh depth-first scan of
//! the watch directory on every [`DirectoryLister::list`] call. The scan is
//! synchronous; async callers run it on the blocking pool.
//!
//! Two conditions void a scan and yield an empty [`Listing`]:
//! * the cancellation token fires before an entry is processed, or
//! * a stop-file is found in any visited directory.
//!
//! The returned [`ScanState`] tells these apart from "nothing matched".

use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ScoutError, ScoutResult};
use crate::fs::file_entry::{FileEntry, TimeBound, base_name};
use crate::fs::lock_probe;
use crate::fs::sorting::{SortContainer, SortMode, sort_containers};

pub const DEFAULT_STOP_FILE: &str = "STOP.txt";

/// `max_depth` value that lifts the recursion limit.
pub const UNBOUNDED_DEPTH: i32 = -1;

// ------------------------------------------------------------
// ListingConfig
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Root directory to scan.
    pub watch_dir: PathBuf,

    pub list_files: bool,

    pub list_dirs: bool,

    pub recursive: bool,

    /// 0 lists only the watch directory, -1 is unbounded.
    pub max_depth: i32,

    /// Full-match regex applied to base names; empty disables the filter.
    pub regexp: String,

    /// Upper bound on the number of results; `None` is unlimited.
    pub max_items: Option<usize>,

    pub sorting: SortMode,

    pub sort_descending: bool,

    /// Inclusive lower bound on the modification time.
    pub min_modified: TimeBound,

    /// Inclusive upper bound on the modification time.
    pub max_modified: TimeBound,

    /// Name of the sentinel file that voids a scan; empty disables it.
    pub stop_file: String,

    /// Leave out files another process holds locked. Only files are
    /// probed; directories always pass this filter.
    pub skip_locked_files: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("."),
            list_files: true,
            list_dirs: false,
            recursive: false,
            max_depth: UNBOUNDED_DEPTH,
            regexp: String::new(),
            max_items: None,
            sorting: SortMode::NoSorting,
            sort_descending: false,
            min_modified: TimeBound::Unbounded,
            max_modified: TimeBound::Unbounded,
            stop_file: DEFAULT_STOP_FILE.to_string(),
            skip_locked_files: false,
        }
    }
}

impl ListingConfig {
    #[must_use]
    pub fn new(watch_dir: impl Into<PathBuf>) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            ..Self::default()
        }
    }

    /// Rejects settings that would make every scan meaningless.
    pub fn validate(&self) -> ScoutResult<()> {
        if self.watch_dir.as_os_str().is_empty() {
            return Err(ScoutError::invalid_config("watch_dir", "must not be empty"));
        }

        if self.max_depth < UNBOUNDED_DEPTH {
            return Err(ScoutError::invalid_config(
                "max_depth",
                "must be -1 (unbounded) or >= 0",
            ));
        }

        if self.max_items == Some(0) {
            return Err(ScoutError::invalid_config(
                "max_items",
                "must be greater than 0 when set",
            ));
        }

        if self.stop_file.contains(MAIN_SEPARATOR) || self.stop_file.contains('/') {
            return Err(ScoutError::invalid_config(
                "stop_file",
                "must be a plain file name",
            ));
        }

        if let (Some(min), Some(max)) = (self.min_modified.instant(), self.max_modified.instant()) {
            if min > max {
                return Err(ScoutError::invalid_config(
                    "min_modified",
                    "must not be later than max_modified",
                ));
            }
        }

        Ok(())
    }

    /// Walk depth (root = 0) of the deepest entries the scan may report.
    fn walk_max_depth(&self) -> Option<usize> {
        if !self.recursive {
            return Some(1);
        }

        usize::try_from(self.max_depth)
            .ok()
            .map(|depth: usize| depth.saturating_add(1))
    }
}

// ------------------------------------------------------------
// Scan results
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Cancellation was observed and the scan was abandoned.
    pub stopped: bool,

    /// A stop-file voided the scan.
    pub stop_file_encountered: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    entries: Vec<FileEntry>,
    state: ScanState,
}

impl Listing {
    fn voided(state: ScanState) -> Self {
        Self {
            entries: Vec::new(),
            state,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }

    /// Absolute paths in result order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(FileEntry::path_string).collect()
    }

    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.state.stopped
    }

    #[must_use]
    pub const fn has_stop_file_encountered(&self) -> bool {
        self.state.stop_file_encountered
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ------------------------------------------------------------
// Filters
// ------------------------------------------------------------

#[inline]
fn matches_name(filter: Option<&Regex>, name: &str) -> bool {
    filter.is_none_or(|regex: &Regex| regex.is_match(name))
}

#[inline]
fn within_bounds(modified: DateTime<Utc>, min: TimeBound, max: TimeBound) -> bool {
    let above_min: bool = min.instant().is_none_or(|min| modified >= min);
    let below_max: bool = max.instant().is_none_or(|max| modified <= max);

    above_min && below_max
}

/// Anchors the user pattern so that it must match the whole base name.
fn compile_name_filter(pattern: &str) -> ScoutResult<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    Regex::new(&format!("^(?:{pattern})$"))
        .map(Some)
        .map_err(|e: regex::Error| ScoutError::invalid_pattern(pattern, e))
}

// ------------------------------------------------------------
// DirectoryLister
// ------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DirectoryLister {
    config: ListingConfig,
    name_filter: Option<Regex>,
}

impl DirectoryLister {
    pub fn new(config: ListingConfig) -> ScoutResult<Self> {
        config.validate()?;
        let name_filter: Option<Regex> = compile_name_filter(&config.regexp)?;

        Ok(Self {
            config,
            name_filter,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ListingConfig {
        &self.config
    }

    /// Replaces the configuration; the old one stays active on error.
    pub fn reconfigure(&mut self, config: ListingConfig) -> ScoutResult<()> {
        *self = Self::new(config)?;

        Ok(())
    }

    /// One-line description used in logs and by search-let summaries.
    #[must_use]
    pub fn summary(&self) -> String {
        let cfg: &ListingConfig = &self.config;
        let mut kinds: Vec<&str> = Vec::with_capacity(2);
        if cfg.list_files {
            kinds.push("files");
        }
        if cfg.list_dirs {
            kinds.push("dirs");
        }

        let mut out: String = format!("{} [{}]", cfg.watch_dir.display(), kinds.join(", "));

        if cfg.recursive {
            if cfg.max_depth == UNBOUNDED_DEPTH {
                out.push_str(" recursive");
            } else {
                out.push_str(&format!(" recursive (depth: {})", cfg.max_depth));
            }
        }
        if !cfg.regexp.is_empty() {
            out.push_str(&format!(", regexp: {}", cfg.regexp));
        }
        if cfg.sorting.is_sorting() {
            let direction: &str = if cfg.sort_descending { "desc" } else { "asc" };
            out.push_str(&format!(", sort: {} {direction}", cfg.sorting));
        }
        if let Some(max) = cfg.max_items {
            out.push_str(&format!(", max: {max}"));
        }

        out
    }

    /// Scans the watch directory with the current configuration.
    #[instrument(
        level = "debug",
        skip_all,
        fields(watch_dir = %self.config.watch_dir.display())
    )]
    pub fn list(&self, cancel: &CancellationToken) -> Listing {
        let start_time: Instant = Instant::now();
        let root: PathBuf = resolve_watch_dir(&self.config.watch_dir);

        debug!("Listing {}", self.summary());

        let mut containers: Vec<SortContainer> = match self.collect(&root, cancel) {
            Ok(containers) => containers,
            Err(state) => return self.finish_voided(state),
        };

        sort_containers(
            &mut containers,
            self.config.sorting,
            self.config.sort_descending,
        );

        let limit: usize = self.config.max_items.unwrap_or(usize::MAX);
        let mut entries: Vec<FileEntry> = Vec::with_capacity(containers.len().min(limit));

        for container in containers {
            if cancel.is_cancelled() {
                return self.finish_voided(ScanState {
                    stopped: true,
                    stop_file_encountered: false,
                });
            }

            if entries.len() >= limit {
                break;
            }

            entries.push(container.entry);
        }

        let duration: Duration = start_time.elapsed();

        info!(
            marker = "DIRECTORY_LISTING",
            operation_type = "list",
            entries = entries.len(),
            duration_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
            "Listed {} entries in {:?}",
            entries.len(),
            duration
        );

        Listing {
            entries,
            state: ScanState::default(),
        }
    }

    /// Walks the tree and records every accepted entry with its sort key.
    ///
    /// Children are visited before their directory, and an unreadable
    /// directory contributes no children.
    fn collect(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<SortContainer>, ScanState> {
        let mut walker: WalkDir = WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .contents_first(true);

        if let Some(depth) = self.config.walk_max_depth() {
            walker = walker.max_depth(depth);
        }

        let mut containers: Vec<SortContainer> = Vec::new();

        for item in walker {
            let entry: DirEntry = match item {
                Ok(entry) => entry,

                Err(e) => {
                    let location: String = e
                        .path()
                        .map_or_else(|| root.display().to_string(), |p| p.display().to_string());

                    warn!("Failed to list {}: {}", location, e);
                    continue;
                }
            };

            let is_dir: bool = entry.file_type().is_dir();
            let name: CompactString = base_name(entry.path());

            if !is_dir && !self.config.stop_file.is_empty() && name == self.config.stop_file {
                info!(
                    marker = "STOP_FILE_ENCOUNTERED",
                    path = %entry.path().display(),
                    "Stop file found, discarding listing"
                );

                return Err(ScanState {
                    stopped: false,
                    stop_file_encountered: true,
                });
            }

            if cancel.is_cancelled() {
                return Err(ScanState {
                    stopped: true,
                    stop_file_encountered: false,
                });
            }

            if let Some(container) = self.accept(&entry, is_dir, &name) {
                containers.push(container);
            }
        }

        Ok(containers)
    }

    fn accept(&self, entry: &DirEntry, is_dir: bool, name: &str) -> Option<SortContainer> {
        let wanted: bool = if is_dir {
            self.config.list_dirs
        } else {
            self.config.list_files
        };

        if !wanted || !matches_name(self.name_filter.as_ref(), name) {
            return None;
        }

        let file_entry: FileEntry = match entry.metadata() {
            Ok(metadata) => FileEntry::from_metadata(entry.path().to_path_buf(), &metadata),

            Err(e) => {
                warn!("Failed to read metadata for {}: {}", entry.path().display(), e);
                return None;
            }
        };

        if !within_bounds(
            file_entry.modified,
            self.config.min_modified,
            self.config.max_modified,
        ) {
            return None;
        }

        // Directories cannot be opened for append, so only files are probed.
        if self.config.skip_locked_files && !is_dir && lock_probe::is_locked(&file_entry.path) {
            debug!("Skipping locked file {}", file_entry.path.display());
            return None;
        }

        Some(SortContainer::new(file_entry, self.config.sorting))
    }

    fn finish_voided(&self, state: ScanState) -> Listing {
        debug!(
            stopped = state.stopped,
            stop_file_encountered = state.stop_file_encountered,
            "Listing of {} voided",
            self.config.watch_dir.display()
        );

        Listing::voided(state)
    }
}

/// Absolute form of the watch directory; falls back to the raw path so the
/// walk itself reports the failure.
fn resolve_watch_dir(watch_dir: &Path) -> PathBuf {
    std::fs::canonicalize(watch_dir)
        .or_else(|_| std::path::absolute(watch_dir))
        .unwrap_or_else(|_| watch_dir.to_path_buf())
}
