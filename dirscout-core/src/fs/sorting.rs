//! `src/fs/sorting.rs`
//!
//! Built-in sort policies for directory listings.
//!
//! Descending order is produced by reversing an ascending, stable sort. Entries
//! with equal keys therefore come out in reverse scan order, which existing
//! consumers rely on.

use std::ffi::OsString;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::file_entry::FileEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    NoSorting,
    ByName,
    ByLastModified,
}

impl SortMode {
    #[inline]
    #[must_use]
    pub const fn is_sorting(self) -> bool {
        !matches!(self, Self::NoSorting)
    }

    /// Computes the key this mode orders `entry` by.
    #[must_use]
    pub fn key_for(self, entry: &FileEntry) -> SortKey {
        match self {
            Self::NoSorting => SortKey::Absent,
            Self::ByName => SortKey::Path(entry.path.as_os_str().to_os_string()),
            Self::ByLastModified => SortKey::Modified(entry.modified),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = match self {
            Self::NoSorting => "no_sorting",
            Self::ByName => "by_name",
            Self::ByLastModified => "by_last_modified",
        };

        write!(f, "{s}")
    }
}

/// Key computed once per entry for a single sort pass.
///
/// One pass only ever holds keys of a single variant. Paths compare as raw
/// OS strings, so names that are not valid UTF-8 still order deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Absent,
    Path(OsString),
    Modified(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct SortContainer {
    pub entry: FileEntry,
    pub key: SortKey,
}

impl SortContainer {
    #[must_use]
    pub fn new(entry: FileEntry, mode: SortMode) -> Self {
        let key: SortKey = mode.key_for(&entry);

        Self { entry, key }
    }
}

/// Orders `containers` by key ascending, then reverses the whole sequence when
/// `descending` is set. `NoSorting` leaves scan order untouched.
pub fn sort_containers(containers: &mut [SortContainer], mode: SortMode, descending: bool) {
    if !mode.is_sorting() {
        return;
    }

    containers.sort_by(|a: &SortContainer, b: &SortContainer| a.key.cmp(&b.key));

    if descending {
        containers.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn entry(path: &str, secs: i64) -> FileEntry {
        FileEntry {
            path: PathBuf::from(path),
            modified: Utc.timestamp_opt(secs, 0).unwrap(),
            is_dir: false,
        }
    }

    fn containers(mode: SortMode, entries: &[FileEntry]) -> Vec<SortContainer> {
        entries
            .iter()
            .cloned()
            .map(|e: FileEntry| SortContainer::new(e, mode))
            .collect()
    }

    fn paths(containers: &[SortContainer]) -> Vec<String> {
        containers.iter().map(|c| c.entry.path_string()).collect()
    }

    #[test]
    fn no_sorting_keeps_scan_order() {
        let mut items = containers(
            SortMode::NoSorting,
            &[entry("/b", 1), entry("/a", 2), entry("/c", 0)],
        );

        sort_containers(&mut items, SortMode::NoSorting, true);

        assert_eq!(paths(&items), ["/b", "/a", "/c"]);
        assert!(items.iter().all(|c| c.key == SortKey::Absent));
    }

    #[test]
    fn by_last_modified_descending() {
        let mut items = containers(
            SortMode::ByLastModified,
            &[entry("/b", 10), entry("/a", 30), entry("/c", 20)],
        );

        sort_containers(&mut items, SortMode::ByLastModified, true);

        assert_eq!(paths(&items), ["/a", "/c", "/b"]);
    }

    #[test]
    fn descending_reverses_ties_too() {
        let mut items = containers(
            SortMode::ByLastModified,
            &[entry("/first", 5), entry("/second", 5), entry("/older", 1)],
        );

        sort_containers(&mut items, SortMode::ByLastModified, true);

        assert_eq!(paths(&items), ["/second", "/first", "/older"]);
    }

    #[test]
    fn name_descending_is_reversed_ascending() {
        let source = [entry("/m", 0), entry("/z", 0), entry("/a", 0), entry("/q", 0)];

        let mut ascending = containers(SortMode::ByName, &source);
        sort_containers(&mut ascending, SortMode::ByName, false);
        let mut reversed: Vec<String> = paths(&ascending);
        reversed.reverse();

        let mut descending = containers(SortMode::ByName, &source);
        sort_containers(&mut descending, SortMode::ByName, true);

        assert_eq!(paths(&descending), reversed);
        assert_eq!(paths(&ascending), ["/a", "/m", "/q", "/z"]);
    }

    #[cfg(unix)]
    #[test]
    fn by_name_orders_non_utf8_names_by_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = |bytes: &[u8]| FileEntry {
            path: PathBuf::from(OsStr::from_bytes(bytes)),
            modified: Utc.timestamp_opt(0, 0).unwrap(),
            is_dir: false,
        };
        let high = raw(b"/in/report-\xff");
        let low = raw(b"/in/report-\xfe");

        for source in [[high.clone(), low.clone()], [low.clone(), high.clone()]] {
            let mut items = containers(SortMode::ByName, &source);
            sort_containers(&mut items, SortMode::ByName, false);

            let ordered: Vec<PathBuf> = items.into_iter().map(|c| c.entry.path).collect();
            assert_eq!(ordered, [low.path.clone(), high.path.clone()]);
        }
    }
}
