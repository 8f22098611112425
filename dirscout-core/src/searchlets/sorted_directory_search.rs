//! Directory search whose results are re-ordered by an injected comparator.
//!
//! The comparator replaces the lister's own sort modes for the final order;
//! descending order is a full reversal, matching the lister.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ScoutResult;
use crate::fs::dir_lister::{DirectoryLister, Listing, ListingConfig};
use crate::searchlets::comparator::PathComparator;
use crate::searchlets::local_directory_search::run_listing;
use crate::searchlets::searchlet::Searchlet;

pub struct SortedDirectorySearch {
    lister: DirectoryLister,
    comparator: Arc<dyn PathComparator>,
    descending: bool,
}

impl SortedDirectorySearch {
    #[must_use]
    pub fn new(lister: DirectoryLister, comparator: Arc<dyn PathComparator>, descending: bool) -> Self {
        Self {
            lister,
            comparator,
            descending,
        }
    }

    pub fn from_config(
        config: ListingConfig,
        comparator: Arc<dyn PathComparator>,
        descending: bool,
    ) -> ScoutResult<Self> {
        Ok(Self::new(DirectoryLister::new(config)?, comparator, descending))
    }
}

#[async_trait]
impl Searchlet for SortedDirectorySearch {
    fn name(&self) -> &'static str {
        "sorted_directory"
    }

    fn summary(&self) -> String {
        let direction: &str = if self.descending { "desc" } else { "asc" };

        format!(
            "{}, comparator: {} {direction}",
            self.lister.summary(),
            self.comparator.name()
        )
    }

    async fn do_search(&self, cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
        let listing: Listing = run_listing(self.name(), &self.lister, cancel).await?;
        let mut paths: Vec<String> = listing.paths();

        paths.sort_by(|a: &String, b: &String| -> Ordering { self.comparator.compare(a, b) });

        if self.descending {
            paths.reverse();
        }

        Ok(paths)
    }
}
