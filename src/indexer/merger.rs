//! Merging every buddy log of one contact into a single chronological view.

use std::mem;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::{Account, ContactId, LogHandle, LogKind, LogText, ReadFlags, Roster};
use crate::parsers::to_plain_text;
use crate::source::{LogSource, read_or_empty};

/// Markup appended after each log of a day transcript
pub const RULE: &str = "<hr>";

/// Working set of log handles borrowed from one source.
///
/// Handles still held when the collection is dropped are released.
pub struct LogCollection<'s, S: LogSource + ?Sized> {
    source: &'s S,
    logs: Vec<LogHandle>,
}

impl<'s, S: LogSource + ?Sized> LogCollection<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self { source, logs: Vec::new() }
    }

    /// Every IM log of every buddy of `contact`, in roster buddy order.
    ///
    /// An unknown contact yields an empty collection.
    pub fn collect(source: &'s S, roster: &Roster, contact: ContactId) -> Self {
        let mut collection = Self::new(source);
        let Some(entry) = roster.contact(contact) else {
            debug!(contact = contact.index(), "Collecting logs for unknown contact");
            return collection;
        };
        for buddy in &entry.buddies {
            collection.logs.extend(source.logs(LogKind::Im, &buddy.name, &buddy.account));
        }
        collection
    }

    pub fn source(&self) -> &'s S {
        self.source
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogHandle> {
        self.logs.iter()
    }

    /// Stable sort, most recent first
    pub fn sort_descending(&mut self) {
        let source = self.source;
        self.logs.sort_by(|a, b| source.compare(b, a));
    }

    /// Stable sort, oldest first
    pub fn sort_ascending(&mut self) {
        let source = self.source;
        self.logs.sort_by(|a, b| source.compare(a, b));
    }

    /// Keep only logs started on `date`, preserving order. Dropped handles are
    /// released right away.
    pub fn filter_by_date(&mut self, date: NaiveDate) {
        let source = self.source;
        let (keep, other): (Vec<LogHandle>, Vec<LogHandle>) = mem::take(&mut self.logs)
            .into_iter()
            .partition(|log| source.timestamp(log).date() == date);
        for log in other {
            source.release(log);
        }
        self.logs = keep;
    }

    /// Take ownership of the remaining handles; the caller must release them
    pub fn into_handles(mut self) -> Vec<LogHandle> {
        mem::take(&mut self.logs)
    }
}

impl<S: LogSource + ?Sized> Drop for LogCollection<'_, S> {
    fn drop(&mut self) {
        for log in self.logs.drain(..) {
            self.source.release(log);
        }
    }
}

/// One log of a day transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub account: Account,
    pub buddy: String,
    pub started: NaiveDateTime,
    pub text: LogText,
}

/// All logs of one contact on one day, most recent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub date: NaiveDate,
    pub entries: Vec<TranscriptEntry>,
    /// Read flags of the last log read, `None` when nothing was read
    pub last_flags: Option<ReadFlags>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The transcript as stored markup, each log followed by [`RULE`]
    pub fn to_markup(&self) -> String {
        self.entries.iter().map(|entry| format!("{}{}", entry.text.text, RULE)).collect()
    }

    /// Plain text for display, one log after another
    pub fn to_plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| to_plain_text(&entry.text.text, entry.text.flags))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render every log of `contact` started on `date`.
///
/// Every collected handle is released before this returns, including those of
/// logs that could not be read.
pub fn render_day<S: LogSource + ?Sized>(
    source: &S,
    roster: &Roster,
    contact: ContactId,
    date: NaiveDate,
) -> Transcript {
    let mut collection = LogCollection::collect(source, roster, contact);
    collection.sort_descending();
    collection.filter_by_date(date);

    let mut transcript = Transcript { date, entries: Vec::new(), last_flags: None };
    for log in collection.into_handles() {
        let text = read_or_empty(source, &log);
        transcript.last_flags = Some(text.flags);
        transcript.entries.push(TranscriptEntry {
            account: log.account().clone(),
            buddy: log.name().to_string(),
            started: source.timestamp(&log),
            text,
        });
        source.release(log);
    }
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Buddy, Contact};
    use crate::source::MemoryLogSource;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, day).unwrap()
    }

    fn alice_fixture() -> (MemoryLogSource, Roster, ContactId) {
        let jabber = Account::new("prpl-jabber", "me@example.org");
        let irc = Account::new("prpl-irc", "me");
        let mut source = MemoryLogSource::new();
        source.add(&jabber, "alice@example.org", at(1, 14), "meeting notes");
        source.add(&irc, "alice_", at(2, 9), "see you");
        source.add(&jabber, "alice@example.org", at(2, 18), "evening");

        let mut roster = Roster::default();
        let alice = roster.push(Contact::new(
            "Alice",
            vec![Buddy::new(jabber, "alice@example.org"), Buddy::new(irc, "alice_")],
        ));
        (source, roster, alice)
    }

    #[test]
    fn test_collect_concatenates_buddies() {
        let (source, roster, alice) = alice_fixture();
        let collection = LogCollection::collect(&source, &roster, alice);
        assert_eq!(collection.len(), 3);
        drop(collection);
        assert_eq!(source.outstanding(), 0);
        assert_eq!(source.released(), 3);
    }

    #[test]
    fn test_collect_unknown_contact_is_empty() {
        let (source, _, _) = alice_fixture();
        let collection = LogCollection::collect(&source, &Roster::default(), ContactId(7));
        assert!(collection.is_empty());
        assert_eq!(source.issued(), 0);
    }

    #[test]
    fn test_sort_orders() {
        let (source, roster, alice) = alice_fixture();
        let mut collection = LogCollection::collect(&source, &roster, alice);

        collection.sort_descending();
        let desc: Vec<NaiveDateTime> = collection.iter().map(|l| source.timestamp(l)).collect();
        assert_eq!(desc, vec![at(2, 18), at(2, 9), at(1, 14)]);

        collection.sort_ascending();
        let asc: Vec<NaiveDateTime> = collection.iter().map(|l| source.timestamp(l)).collect();
        assert_eq!(asc, vec![at(1, 14), at(2, 9), at(2, 18)]);
    }

    #[test]
    fn test_filter_by_date_is_exact_and_idempotent() {
        let (source, roster, alice) = alice_fixture();
        let mut collection = LogCollection::collect(&source, &roster, alice);
        collection.sort_descending();

        collection.filter_by_date(may(2));
        assert_eq!(collection.len(), 2);
        assert_eq!(source.outstanding(), 2);

        collection.filter_by_date(may(2));
        assert_eq!(collection.len(), 2);

        collection.filter_by_date(may(3));
        assert!(collection.is_empty());
        assert_eq!(source.outstanding(), 0);
        assert_eq!(source.over_released(), 0);
    }

    #[test]
    fn test_render_day_reads_only_that_day() {
        let (source, roster, alice) = alice_fixture();
        let transcript = render_day(&source, &roster, alice, may(1));

        assert_eq!(transcript.entries.len(), 1);
        assert_eq!(transcript.entries[0].text.text, "meeting notes");
        assert_eq!(transcript.to_markup(), "meeting notes<hr>");
        assert_eq!(transcript.last_flags, Some(ReadFlags::empty()));
        assert_eq!(source.reads(), 1);
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_render_day_most_recent_first() {
        let (source, roster, alice) = alice_fixture();
        let transcript = render_day(&source, &roster, alice, may(2));
        let texts: Vec<&str> = transcript.entries.iter().map(|e| e.text.text.as_str()).collect();
        assert_eq!(texts, vec!["evening", "see you"]);
        assert_eq!(transcript.to_plain_text(), "evening\nsee you");
    }

    #[test]
    fn test_render_day_unreadable_log_is_empty_and_released() {
        let (mut source, roster, alice) = alice_fixture();
        source.add_unreadable(&Account::new("prpl-irc", "me"), "alice_", at(3, 8));

        let transcript = render_day(&source, &roster, alice, may(3));
        assert_eq!(transcript.entries.len(), 1);
        assert_eq!(transcript.entries[0].text, LogText::empty());
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_render_day_without_logs_keeps_flags_unset() {
        let (source, roster, alice) = alice_fixture();
        let transcript = render_day(&source, &roster, alice, may(20));
        assert!(transcript.is_empty());
        assert_eq!(transcript.last_flags, None);
    }
}
