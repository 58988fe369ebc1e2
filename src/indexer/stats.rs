//! Corpus-wide counts for the `stats` command.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::models::{LogKind, Roster};
use crate::source::LogSource;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub contacts: usize,
    pub buddies: usize,
    pub contacts_with_logs: usize,
    pub logs: usize,
    /// Log count per protocol
    pub protocols: BTreeMap<String, usize>,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

/// Count the IM logs of every roster buddy without reading any of them
pub fn compute_stats<S: LogSource + ?Sized>(source: &S, roster: &Roster) -> CorpusStats {
    let mut stats =
        CorpusStats { contacts: roster.len(), buddies: roster.buddy_count(), ..Default::default() };
    let mut with_logs = HashSet::new();

    for (id, _, buddy) in roster.buddies() {
        for log in source.logs(LogKind::Im, &buddy.name, &buddy.account) {
            let day = source.timestamp(&log).date();
            stats.logs += 1;
            *stats.protocols.entry(log.account().protocol.clone()).or_insert(0) += 1;
            stats.first_day = Some(stats.first_day.map_or(day, |first| first.min(day)));
            stats.last_day = Some(stats.last_day.map_or(day, |last| last.max(day)));
            with_logs.insert(id);
            source.release(log);
        }
    }

    stats.contacts_with_logs = with_logs.len();
    stats
}
