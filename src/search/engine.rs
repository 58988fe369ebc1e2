//! Step-driven full-text scan over every buddy in the roster.

use std::collections::VecDeque;

use tracing::debug;

use super::cancel::CancelFlag;
use crate::models::{
    ContactId, LogHandle, LogKind, LogTimestamp, Roster, SearchMatch, format_log_date,
};
use crate::parsers::to_plain_text;
use crate::source::{LogSource, read_or_empty};

/// Date format used for search results unless configured otherwise
pub const DEFAULT_DATE_FORMAT: &str = "%a %d %b %Y %I:%M %p";

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every buddy in the roster was scanned
    Completed,
    /// The cancel flag was observed, or the term was empty
    Cancelled,
}

/// Result of one [`SearchTask::step`]
#[derive(Debug, PartialEq, Eq)]
pub enum SearchStep {
    /// The inspected log matched; the caller now owns its handle
    Matched(SearchMatch),
    /// The inspected log did not match and was released
    Scanned,
    Finished(SearchOutcome),
}

/// An in-flight search.
///
/// Each call to [`step`](Self::step) inspects at most one log, so the caller's
/// loop gets control back between logs and can cancel. The task borrows nothing:
/// the source and roster are passed to every step.
#[derive(Debug)]
pub struct SearchTask {
    term: String,
    needle: String,
    date_format: String,
    cancel: CancelFlag,
    // Next buddy to load, as (contact index, buddy index)
    cursor: (usize, usize),
    current_alias: String,
    pending: VecDeque<LogHandle>,
    inspected: usize,
    matches: usize,
    outcome: Option<SearchOutcome>,
}

impl SearchTask {
    /// Start a search for `term`. An empty term yields a task that is already
    /// finished as cancelled.
    pub fn new(term: &str, cancel: CancelFlag) -> Self {
        let outcome = term.is_empty().then_some(SearchOutcome::Cancelled);
        Self {
            term: term.to_string(),
            needle: term.to_lowercase(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            cancel,
            cursor: (0, 0),
            current_alias: String::new(),
            pending: VecDeque::new(),
            inspected: 0,
            matches: 0,
            outcome,
        }
    }

    /// Format result dates with `pattern` instead of [`DEFAULT_DATE_FORMAT`]
    pub fn with_date_format(mut self, pattern: &str) -> Self {
        self.date_format = pattern.to_string();
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Logs read so far
    pub fn inspected(&self) -> usize {
        self.inspected
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn outcome(&self) -> Option<SearchOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Inspect the next log.
    ///
    /// The cancel flag is checked before each log is read and before each buddy's
    /// logs are loaded. When it is set, the handle in hand and every pending
    /// handle are released and the task finishes as cancelled. Once finished,
    /// further steps return the same outcome.
    pub fn step<S: LogSource + ?Sized>(&mut self, source: &S, roster: &Roster) -> SearchStep {
        if let Some(outcome) = self.outcome {
            return SearchStep::Finished(outcome);
        }

        loop {
            if let Some(log) = self.pending.pop_front() {
                if self.cancel.is_cancelled() {
                    source.release(log);
                    return self.finish_cancelled(source);
                }
                return self.inspect(source, log);
            }

            if self.cancel.is_cancelled() {
                return self.finish_cancelled(source);
            }
            if !self.load_next_buddy(source, roster) {
                debug!(
                    term = %self.term,
                    inspected = self.inspected,
                    matches = self.matches,
                    "Search completed"
                );
                self.outcome = Some(SearchOutcome::Completed);
                return SearchStep::Finished(SearchOutcome::Completed);
            }
        }
    }

    /// Stop the search now and release every pending handle
    pub fn abort<S: LogSource + ?Sized>(&mut self, source: &S) {
        if self.outcome.is_none() {
            self.finish_cancelled(source);
        }
    }

    fn inspect<S: LogSource + ?Sized>(&mut self, source: &S, log: LogHandle) -> SearchStep {
        self.inspected += 1;
        let text = read_or_empty(source, &log);
        if !to_plain_text(&text.text, text.flags).to_lowercase().contains(&self.needle) {
            source.release(log);
            return SearchStep::Scanned;
        }

        self.matches += 1;
        let started = LogTimestamp::Breakdown(source.timestamp(&log));
        SearchStep::Matched(SearchMatch {
            alias: self.current_alias.clone(),
            date: format_log_date(started, &self.date_format),
            log,
        })
    }

    fn load_next_buddy<S: LogSource + ?Sized>(&mut self, source: &S, roster: &Roster) -> bool {
        let (contact_idx, buddy_idx) = self.cursor;
        let Some(contact) = roster.contact(ContactId(contact_idx)) else {
            return false;
        };
        let Some(buddy) = contact.buddies.get(buddy_idx) else {
            self.cursor = (contact_idx + 1, 0);
            return true;
        };

        self.cursor = (contact_idx, buddy_idx + 1);
        self.current_alias = if contact.alias.is_empty() {
            buddy.display_alias().to_string()
        } else {
            contact.alias.clone()
        };
        self.pending.extend(source.logs(LogKind::Im, &buddy.name, &buddy.account));
        true
    }

    fn finish_cancelled<S: LogSource + ?Sized>(&mut self, source: &S) -> SearchStep {
        for log in self.pending.drain(..) {
            source.release(log);
        }
        debug!(
            term = %self.term,
            inspected = self.inspected,
            matches = self.matches,
            "Search cancelled"
        );
        self.outcome = Some(SearchOutcome::Cancelled);
        SearchStep::Finished(SearchOutcome::Cancelled)
    }
}

/// Iterator over the matches of a task, stepping it to completion.
///
/// Dropping the iterator early releases every handle the task still holds.
pub struct Search<'a, S: LogSource + ?Sized> {
    task: SearchTask,
    source: &'a S,
    roster: &'a Roster,
}

impl<'a, S: LogSource + ?Sized> Search<'a, S> {
    pub fn new(task: SearchTask, source: &'a S, roster: &'a Roster) -> Self {
        Self { task, source, roster }
    }

    pub fn task(&self) -> &SearchTask {
        &self.task
    }
}

impl<S: LogSource + ?Sized> Iterator for Search<'_, S> {
    type Item = SearchMatch;

    fn next(&mut self) -> Option<SearchMatch> {
        loop {
            match self.task.step(self.source, self.roster) {
                SearchStep::Matched(found) => return Some(found),
                SearchStep::Scanned => continue,
                SearchStep::Finished(_) => return None,
            }
        }
    }
}

impl<S: LogSource + ?Sized> Drop for Search<'_, S> {
    fn drop(&mut self) {
        self.task.abort(self.source);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::models::{Account, Buddy, Contact, ReadFlags};
    use crate::source::MemoryLogSource;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn fixture() -> (MemoryLogSource, Roster) {
        let jabber = Account::new("prpl-jabber", "me@example.org");
        let irc = Account::new("prpl-irc", "me");
        let mut source = MemoryLogSource::new();
        source.add_with_flags(
            &jabber,
            "alice@example.org",
            at(1, 14),
            "<b>alice:</b> meeting notes<br/>",
            ReadFlags::NO_NEWLINE,
        );
        source.add(&irc, "alice_", at(2, 9), "Hello there");
        source.add(&jabber, "bob@example.org", at(3, 10), "hello");
        source.add_unreadable(&jabber, "bob@example.org", at(4, 10));

        let mut roster = Roster::default();
        roster.push(Contact::new(
            "Alice",
            vec![Buddy::new(jabber.clone(), "alice@example.org"), Buddy::new(irc, "alice_")],
        ));
        roster.push(Contact::new(
            "",
            vec![Buddy::new(jabber, "bob@example.org").with_alias("Bobby")],
        ));
        (source, roster)
    }

    fn run(source: &MemoryLogSource, roster: &Roster, term: &str) -> Vec<SearchMatch> {
        let mut task = SearchTask::new(term, CancelFlag::new());
        let mut found = Vec::new();
        loop {
            match task.step(source, roster) {
                SearchStep::Matched(m) => found.push(m),
                SearchStep::Scanned => {}
                SearchStep::Finished(outcome) => {
                    assert_eq!(outcome, SearchOutcome::Completed);
                    break;
                }
            }
        }
        found
    }

    fn release_all(source: &MemoryLogSource, found: Vec<SearchMatch>) {
        for m in found {
            source.release(m.log);
        }
    }

    #[test]
    fn test_search_finds_stripped_text() {
        let (source, roster) = fixture();
        let found = run(&source, &roster, "notes");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].alias, "Alice");
        assert_eq!(found[0].date, "Mon 01 May 2023 02:00 PM");
        assert_eq!(source.outstanding(), 1);
        release_all(&source, found);
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_search_does_not_match_markup() {
        let (source, roster) = fixture();
        let found = run(&source, &roster, "<b>");
        assert!(found.is_empty());
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (source, roster) = fixture();

        let lower = run(&source, &roster, "hello");
        assert_eq!(lower.len(), 2);
        release_all(&source, lower);

        let upper = run(&source, &roster, "HELLO");
        assert_eq!(upper.len(), 2);
        release_all(&source, upper);

        let longer = run(&source, &roster, "helloo");
        assert!(longer.is_empty());
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_alias_falls_back_to_buddy_alias() {
        let (source, roster) = fixture();
        let found = run(&source, &roster, "hello");
        let aliases: Vec<&str> = found.iter().map(|m| m.alias.as_str()).collect();
        assert_eq!(aliases, vec!["Alice", "Bobby"]);
        release_all(&source, found);
    }

    #[test]
    fn test_every_log_inspected_once_including_unreadable() {
        let (source, roster) = fixture();
        let mut task = SearchTask::new("zzz", CancelFlag::new());
        while !task.is_finished() {
            task.step(&source, &roster);
        }
        assert_eq!(task.inspected(), 4);
        assert_eq!(source.reads(), 4);
        assert_eq!(source.outstanding(), 0);
        assert_eq!(source.released(), 4);
    }

    #[test]
    fn test_cancel_releases_in_hand_and_pending() {
        let (source, roster) = fixture();
        let cancel = CancelFlag::new();
        let mut task = SearchTask::new("e", cancel.clone());

        let first = task.step(&source, &roster);
        assert!(matches!(first, SearchStep::Matched(_)));
        cancel.cancel();

        assert_eq!(task.step(&source, &roster), SearchStep::Finished(SearchOutcome::Cancelled));
        assert_eq!(task.inspected(), 1);
        assert_eq!(task.step(&source, &roster), SearchStep::Finished(SearchOutcome::Cancelled));

        // Only the match handed to us is still out
        assert_eq!(source.outstanding(), 1);
        if let SearchStep::Matched(m) = first {
            source.release(m.log);
        }
        assert_eq!(source.over_released(), 0);
    }

    #[test]
    fn test_empty_term_is_finished_immediately() {
        let (source, roster) = fixture();
        let mut task = SearchTask::new("", CancelFlag::new());
        assert!(task.is_finished());
        assert_eq!(task.step(&source, &roster), SearchStep::Finished(SearchOutcome::Cancelled));
        assert_eq!(source.issued(), 0);
    }

    #[test]
    fn test_custom_date_format() {
        let (source, roster) = fixture();
        let task = SearchTask::new("notes", CancelFlag::new()).with_date_format("%Y-%m-%d");
        let mut search = Search::new(task, &source, &roster);
        let found = search.next().unwrap();
        assert_eq!(found.date, "2023-05-01");
        source.release(found.log);
    }

    #[test]
    fn test_dropping_iterator_releases_pending() {
        let (source, roster) = fixture();
        let mut search = Search::new(SearchTask::new("alice", CancelFlag::new()), &source, &roster);
        let found = search.next().unwrap();
        drop(search);

        assert_eq!(source.outstanding(), 1);
        source.release(found.log);
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_iterator_collects_all_matches() {
        let (source, roster) = fixture();
        let search = Search::new(SearchTask::new("hello", CancelFlag::new()), &source, &roster);
        let found: Vec<SearchMatch> = search.collect();
        assert_eq!(found.len(), 2);
        release_all(&source, found);
        assert_eq!(source.outstanding(), 0);
    }
}
