use std::cmp::Ordering;

use tracing::warn;

use crate::models::SearchMatch;
use crate::source::LogSource;

/// Matches retained for display. Owns the handle of every match it holds.
///
/// The set does not know its source, so it cannot release handles by itself:
/// call [`clear`](Self::clear) before dropping it. Dropping a non-empty set
/// logs a warning and leaves the handles unreleased.
#[derive(Debug, Default)]
pub struct SearchResults {
    matches: Vec<SearchMatch>,
}

impl SearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain a match; returns its index
    pub fn push(&mut self, found: SearchMatch) -> usize {
        self.matches.push(found);
        self.matches.len() - 1
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SearchMatch> {
        self.matches.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchMatch> {
        self.matches.iter()
    }

    /// Retain a match keeping the set most recent first; returns its index.
    ///
    /// A match ties with earlier ones of the same time and goes after them.
    pub fn insert_most_recent_first<S: LogSource + ?Sized>(
        &mut self,
        source: &S,
        found: SearchMatch,
    ) -> usize {
        let index = self
            .matches
            .partition_point(|held| source.compare(&held.log, &found.log) != Ordering::Less);
        self.matches.insert(index, found);
        index
    }

    /// Stable sort, most recent log first
    pub fn sort_most_recent_first<S: LogSource + ?Sized>(&mut self, source: &S) {
        self.matches.sort_by(|a, b| source.compare(&b.log, &a.log));
    }

    /// Drop every match, releasing its handle
    pub fn clear<S: LogSource + ?Sized>(&mut self, source: &S) {
        for found in self.matches.drain(..) {
            source.release(found.log);
        }
    }
}

impl Drop for SearchResults {
    fn drop(&mut self) {
        if !self.matches.is_empty() {
            warn!(matches = self.matches.len(), "Search results dropped without release");
        }
    }
}
