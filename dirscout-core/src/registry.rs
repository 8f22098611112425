//! ``src/registry.rs``
//! ============================================================================
//! # Registry: named comparators and declarative search trees
//!
//! Comparators are looked up by name in an explicit map filled at startup.
//! Search-let trees are described by [`SearchSpec`], a serde enum tagged by
//! `type`, and turned into live search-lets with [`SearchSpec::build`].
//!
//! ```toml
//! [search]
//! type = "blocking"
//! interval = "500ms"
//! timeout = "30s"
//!
//! [search.inner]
//! type = "local_directory"
//!
//! [search.inner.listing]
//! watch_dir = "/var/spool/incoming"
//! regexp = ".*\\.csv"
//! ```

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::{ScoutError, ScoutResult};
use crate::fs::dir_lister::ListingConfig;
use crate::searchlets::{
    BlockingSearch, ExtensionComparator, FileNameComparator, LocalDirectorySearch, MultiSearch,
    PathComparator, PathLengthComparator, Searchlet, SortedDirectorySearch,
    blocking_search::DEFAULT_INTERVAL,
};

pub type ComparatorCtor = fn() -> Arc<dyn PathComparator>;

// ------------------------------------------------------------
// ComparatorRegistry
// ------------------------------------------------------------

pub struct ComparatorRegistry {
    ctors: AHashMap<CompactString, ComparatorCtor>,
}

impl ComparatorRegistry {
    /// Registry without any comparators.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ctors: AHashMap::new(),
        }
    }

    /// Registry holding `file_name`, `extension` and `path_length`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry: Self = Self::empty();

        registry.register("file_name", || Arc::new(FileNameComparator));
        registry.register("extension", || Arc::new(ExtensionComparator));
        registry.register("path_length", || Arc::new(PathLengthComparator));

        registry
    }

    /// Adds or replaces the constructor registered under `name`.
    pub fn register(&mut self, name: &str, ctor: ComparatorCtor) {
        self.ctors.insert(CompactString::new(name), ctor);
    }

    pub fn resolve(&self, name: &str) -> ScoutResult<Arc<dyn PathComparator>> {
        self.ctors
            .get(name)
            .map(|ctor: &ComparatorCtor| ctor())
            .ok_or_else(|| ScoutError::UnknownComparator(CompactString::new(name)))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<CompactString> {
        let mut names: Vec<CompactString> = self.ctors.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// ------------------------------------------------------------
// SearchSpec
// ------------------------------------------------------------

const fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchSpec {
    LocalDirectory {
        #[serde(default)]
        listing: ListingConfig,
    },

    SortedDirectory {
        #[serde(default)]
        listing: ListingConfig,

        comparator: String,

        #[serde(default)]
        descending: bool,
    },

    Blocking {
        #[serde(with = "humantime_serde", default = "default_interval")]
        interval: Duration,

        #[serde(with = "humantime_serde", default)]
        timeout: Option<Duration>,

        inner: Box<SearchSpec>,
    },

    Multi {
        #[serde(default)]
        searches: Vec<SearchSpec>,
    },
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self::LocalDirectory {
            listing: ListingConfig::default(),
        }
    }
}

impl SearchSpec {
    /// Builds the live search-let tree; configuration errors surface here.
    pub fn build(&self, comparators: &ComparatorRegistry) -> ScoutResult<Box<dyn Searchlet>> {
        let searchlet: Box<dyn Searchlet> = match self {
            Self::LocalDirectory { listing } => {
                Box::new(LocalDirectorySearch::from_config(listing.clone())?)
            }

            Self::SortedDirectory {
                listing,
                comparator,
                descending,
            } => Box::new(SortedDirectorySearch::from_config(
                listing.clone(),
                comparators.resolve(comparator)?,
                *descending,
            )?),

            Self::Blocking {
                inner,
                interval,
                timeout,
            } => Box::new(BlockingSearch::new(
                inner.build(comparators)?,
                *interval,
                *timeout,
            )),

            Self::Multi { searches } => {
                let built: Vec<Box<dyn Searchlet>> = searches
                    .iter()
                    .map(|spec: &Self| spec.build(comparators))
                    .collect::<ScoutResult<_>>()?;

                Box::new(MultiSearch::new(built))
            }
        };

        searchlet.check()?;

        Ok(searchlet)
    }
}
