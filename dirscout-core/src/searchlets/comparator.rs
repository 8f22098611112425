//! Path comparators injected into comparator-sorted searches.

use std::cmp::Ordering;
use std::path::Path;

pub trait PathComparator: Send + Sync {
    fn name(&self) -> &'static str;

    fn compare(&self, a: &str, b: &str) -> Ordering;
}

fn file_name_of(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

fn extension_of(path: &str) -> &str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

/// Orders by base name, then by full path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameComparator;

impl PathComparator for FileNameComparator {
    fn name(&self) -> &'static str {
        "file_name"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        file_name_of(a)
            .cmp(file_name_of(b))
            .then_with(|| a.cmp(b))
    }
}

/// Orders by extension, then by base name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionComparator;

impl PathComparator for ExtensionComparator {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        extension_of(a)
            .cmp(extension_of(b))
            .then_with(|| FileNameComparator.compare(a, b))
    }
}

/// Orders by path length in characters, then by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLengthComparator;

impl PathComparator for PathLengthComparator {
    fn name(&self) -> &'static str {
        "path_length"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(comparator: &dyn PathComparator, input: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = input.iter().map(|s| (*s).to_string()).collect();
        out.sort_by(|a, b| comparator.compare(a, b));
        out
    }

    #[test]
    fn file_name_ignores_directories() {
        assert_eq!(
            sorted(&FileNameComparator, &["/z/a.txt", "/a/c.txt", "/m/b.txt"]),
            ["/z/a.txt", "/m/b.txt", "/a/c.txt"]
        );
    }

    #[test]
    fn extension_groups_then_names() {
        assert_eq!(
            sorted(
                &ExtensionComparator,
                &["/d/b.txt", "/d/a.txt", "/d/c.csv", "/d/noext"]
            ),
            ["/d/noext", "/d/c.csv", "/d/a.txt", "/d/b.txt"]
        );
    }

    #[test]
    fn path_length_shortest_first() {
        assert_eq!(
            sorted(&PathLengthComparator, &["/abc/x", "/a/x", "/ab/x"]),
            ["/a/x", "/ab/x", "/abc/x"]
        );
    }
}
