//! Log record sources.
//!
//! The engine never opens or parses raw logs itself. Everything goes through the
//! [`LogSource`] trait, which hands out [`LogHandle`]s, materializes them into
//! text and takes them back when the caller is done.
//!
//! # Ownership
//!
//! Every handle returned by [`LogSource::logs`] belongs to the caller until it is
//! moved into [`LogSource::release`]. Because handles are not `Clone`, a handle
//! can be released at most once; the engine's collection types release whatever
//! they still hold when dropped, so each handle is released exactly once.
//!
//! Implementations:
//!
//! - [`PurpleLogDir`] - the client's on-disk `logs/` tree
//! - [`MemoryLogSource`] - an in-memory store that counts reads and releases

pub mod memory;
pub mod purple_dir;

use std::cmp::Ordering;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::warn;

pub use memory::MemoryLogSource;
pub use purple_dir::PurpleLogDir;

use crate::models::{Account, LogHandle, LogKind, LogText};

/// Provider of stored conversation logs
pub trait LogSource {
    /// All logs of `kind` with `name` on `account`; empty when there are none
    fn logs(&self, kind: LogKind, name: &str, account: &Account) -> Vec<LogHandle>;

    /// Materialize a log into its text and read flags
    fn read(&self, log: &LogHandle) -> Result<LogText>;

    /// Give a handle back to the source
    fn release(&self, log: LogHandle);

    /// Resolve when a log was started
    fn timestamp(&self, log: &LogHandle) -> NaiveDateTime {
        log.timestamp().civil()
    }

    /// Canonical chronological order (oldest first)
    fn compare(&self, a: &LogHandle, b: &LogHandle) -> Ordering {
        self.timestamp(a).cmp(&self.timestamp(b))
    }
}

/// Read a log, treating any failure as empty text.
///
/// A log that cannot be read contributes nothing; the failure is logged and the
/// caller carries on with the rest of the corpus.
pub fn read_or_empty<S: LogSource + ?Sized>(source: &S, log: &LogHandle) -> LogText {
    match source.read(log) {
        Ok(text) => text,
        Err(e) => {
            warn!(log = log.key(), error = %e, "Failed to read log, treating it as empty");
            LogText::empty()
        }
    }
}
