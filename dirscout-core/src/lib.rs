//! # dirscout-core
//!
//! Recursive directory listings with name, timestamp and lock filters, plus
//! composable, cancellable search-lets built on top of them.

pub mod error;

pub mod config;

pub mod logging;
pub use logging::Logger;

pub mod fs {
    pub mod dir_lister;
    pub use dir_lister::{DirectoryLister, Listing, ListingConfig, ScanState};

    pub mod file_entry;
    pub use file_entry::{FileEntry, TimeBound};

    pub mod lock_probe;

    pub mod sorting;
    pub use sorting::{SortContainer, SortKey, SortMode};
}

pub mod searchlets {
    pub mod searchlet;
    pub use searchlet::Searchlet;

    pub mod comparator;
    pub use comparator::{
        ExtensionComparator, FileNameComparator, PathComparator, PathLengthComparator,
    };

    pub mod local_directory_search;
    pub use local_directory_search::LocalDirectorySearch;

    pub mod sorted_directory_search;
    pub use sorted_directory_search::SortedDirectorySearch;

    pub mod blocking_search;
    pub use blocking_search::BlockingSearch;

    pub mod multi_search;
    pub use multi_search::MultiSearch;
}

pub mod registry;
pub use registry::{ComparatorRegistry, SearchSpec};

pub use config::Config;
pub use error::{ScoutError, ScoutResult};
