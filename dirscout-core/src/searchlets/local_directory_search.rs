//! Search-let backed by a [`DirectoryLister`] on the local file system.

use async_trait::async_trait;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ScoutError, ScoutResult};
use crate::fs::dir_lister::{DirectoryLister, Listing, ListingConfig};
use crate::searchlets::searchlet::Searchlet;

pub struct LocalDirectorySearch {
    lister: DirectoryLister,
}

impl LocalDirectorySearch {
    #[must_use]
    pub const fn new(lister: DirectoryLister) -> Self {
        Self { lister }
    }

    pub fn from_config(config: ListingConfig) -> ScoutResult<Self> {
        Ok(Self::new(DirectoryLister::new(config)?))
    }

    #[must_use]
    pub const fn lister(&self) -> &DirectoryLister {
        &self.lister
    }

    pub fn lister_mut(&mut self) -> &mut DirectoryLister {
        &mut self.lister
    }
}

/// Runs one scan on the blocking pool so the async runtime keeps going.
pub(crate) async fn run_listing(
    search: &'static str,
    lister: &DirectoryLister,
    cancel: &CancellationToken,
) -> ScoutResult<Listing> {
    let lister: DirectoryLister = lister.clone();
    let cancel: CancellationToken = cancel.clone();

    let listing: Listing = tokio::task::spawn_blocking(move || lister.list(&cancel))
        .await
        .map_err(|e: JoinError| ScoutError::task_join(search, &e.to_string()))?;

    debug!(
        search,
        entries = listing.len(),
        stopped = listing.is_stopped(),
        stop_file_encountered = listing.has_stop_file_encountered(),
        "Directory scan finished"
    );

    Ok(listing)
}

#[async_trait]
impl Searchlet for LocalDirectorySearch {
    fn name(&self) -> &'static str {
        "local_directory"
    }

    fn summary(&self) -> String {
        self.lister.summary()
    }

    async fn do_search(&self, cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
        let listing: Listing = run_listing(self.name(), &self.lister, cancel).await?;

        Ok(listing.paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::dir_lister::DEFAULT_STOP_FILE;
    use std::fs;

    #[tokio::test]
    async fn returns_absolute_paths_of_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), b"1").unwrap();
        fs::write(dir.path().join("b.txt"), b"2").unwrap();

        let search = LocalDirectorySearch::from_config(ListingConfig {
            regexp: r".*\.log".to_string(),
            ..ListingConfig::new(dir.path())
        })
        .unwrap();

        let found = search.search(&CancellationToken::new()).await.unwrap();

        let expected = fs::canonicalize(dir.path()).unwrap().join("a.log");
        assert_eq!(found, [expected.to_string_lossy().into_owned()]);
    }

    #[tokio::test]
    async fn stop_file_reads_as_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), b"1").unwrap();
        fs::write(dir.path().join(DEFAULT_STOP_FILE), b"").unwrap();

        let search = LocalDirectorySearch::from_config(ListingConfig::new(dir.path())).unwrap();

        assert!(search.search(&CancellationToken::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconfigured_lister_is_used_by_next_search() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/deep.txt"), b"1").unwrap();

        let mut search = LocalDirectorySearch::from_config(ListingConfig::new(dir.path())).unwrap();
        assert!(search.search(&CancellationToken::new()).await.unwrap().is_empty());

        search
            .lister_mut()
            .reconfigure(ListingConfig {
                recursive: true,
                ..ListingConfig::new(dir.path())
            })
            .unwrap();

        assert_eq!(search.search(&CancellationToken::new()).await.unwrap().len(), 1);
    }
}
