//! `src/fs/lock_probe.rs`
//!
//! Best-effort check whether another process holds a file.
//!
//! The probe opens the file for append and tries to take an exclusive advisory
//! lock, releasing it immediately. The answer is stale the moment it is
//! returned (the holder may lock or unlock right after), and advisory locks are
//! only honoured by cooperating processes, so the probe must not be used as a
//! correctness guarantee. On Windows the open itself fails for files opened
//! without sharing, which also reads as "locked".

use std::fs::{File, OpenOptions};
use std::path::Path;

use fd_lock::RwLock;
use tracing::trace;

/// Returns `true` if `path` could not be opened for append or exclusively
/// locked. Every failure counts as locked.
#[must_use]
pub fn is_locked(path: &Path) -> bool {
    let file: File = match OpenOptions::new().append(true).open(path) {
        Ok(file) => file,

        Err(e) => {
            trace!("Lock probe could not open {}: {}", path.display(), e);
            return true;
        }
    };

    let mut lock: RwLock<File> = RwLock::new(file);

    match lock.try_write() {
        Ok(_guard) => false,

        Err(e) => {
            trace!("Lock probe could not lock {}: {}", path.display(), e);
            true
        }
    }
}
