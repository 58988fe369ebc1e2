use std::mem;

use chrono::{Local, NaiveDate};
use tracing::debug;

use super::events::ViewEvent;
use crate::config::ViewerConfig;
use crate::indexer::{
    CalendarCursor, CalendarMonthSummary, ContactEntry, ContactFilter, RULE, build_contact_list,
    latest_log_date, render_day, summarize,
};
use crate::models::{ContactId, ReadFlags, Roster};
use crate::search::{CancelFlag, SearchResults, SearchStep, SearchTask};
use crate::source::{LogSource, read_or_empty};

/// One browsing session over a log source.
///
/// Holds everything the viewer remembers between user actions: the selected
/// contact and day, the month on display, the running search and its retained
/// results. Dropping the session stops the search and releases every retained
/// handle.
pub struct LogViewer<S: LogSource> {
    source: S,
    roster: Roster,
    config: ViewerConfig,
    contacts: Vec<ContactEntry>,
    filter: ContactFilter,
    selected: Option<ContactId>,
    cursor: CalendarCursor,
    summary: CalendarMonthSummary,
    selected_day: Option<NaiveDate>,
    conversation_flags: ReadFlags,
    search_flags: ReadFlags,
    search: Option<SearchTask>,
    cancel: CancelFlag,
    results: SearchResults,
    events: Vec<ViewEvent>,
}

impl<S: LogSource> LogViewer<S> {
    /// Build the contact list and queue a [`ViewEvent::ContactListed`] per contact
    pub fn open(source: S, roster: Roster, config: ViewerConfig) -> Self {
        let contacts = build_contact_list(&source, &roster);
        debug!(contacts = contacts.len(), "Contact list built");

        let events = contacts
            .iter()
            .map(|entry| ViewEvent::ContactListed { contact: entry.id, alias: entry.alias.clone() })
            .collect();
        let cursor = CalendarCursor::containing(Local::now().date_naive());

        Self {
            source,
            roster,
            config,
            contacts,
            filter: ContactFilter::default(),
            selected: None,
            cursor,
            summary: CalendarMonthSummary::empty(cursor.year, cursor.month),
            selected_day: None,
            conversation_flags: ReadFlags::empty(),
            search_flags: ReadFlags::empty(),
            search: None,
            cancel: CancelFlag::new(),
            results: SearchResults::new(),
            events,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Every contact with logs, sorted by alias
    pub fn contacts(&self) -> &[ContactEntry] {
        &self.contacts
    }

    pub fn set_contact_filter(&mut self, text: &str) {
        self.filter.set(text);
    }

    pub fn contact_filter(&self) -> &str {
        self.filter.text()
    }

    /// Contacts whose alias starts with the filter text
    pub fn visible_contacts(&self) -> Vec<&ContactEntry> {
        self.filter.apply(&self.contacts).collect()
    }

    pub fn selected_contact(&self) -> Option<ContactId> {
        self.selected
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn summary(&self) -> &CalendarMonthSummary {
        &self.summary
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.selected_day
    }

    /// Read flags of the last log shown in the transcript
    pub fn conversation_flags(&self) -> ReadFlags {
        self.conversation_flags
    }

    /// Read flags of the last opened search result
    pub fn search_flags(&self) -> ReadFlags {
        self.search_flags
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// (logs inspected, matches) of the running search
    pub fn search_progress(&self) -> Option<(usize, usize)> {
        self.search.as_ref().map(|task| (task.inspected(), task.matches()))
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        mem::take(&mut self.events)
    }

    /// Select a contact and jump to its most recent log.
    ///
    /// Shows the month of the latest log (or the current month when the contact
    /// has none), marks its days and selects the latest day. `None` clears the
    /// selection and the month's marks without queueing events.
    pub fn select_contact(&mut self, contact: Option<ContactId>) {
        self.selected = contact;
        let Some(contact) = contact else {
            self.summary = CalendarMonthSummary::empty(self.cursor.year, self.cursor.month);
            return;
        };

        let latest = latest_log_date(&self.source, &self.roster, contact)
            .unwrap_or_else(|| Local::now().date_naive());
        self.cursor = CalendarCursor::containing(latest);
        self.refresh_month();
    }

    /// Show the transcript of `day` in the displayed month.
    ///
    /// Days that do not exist in the month are ignored. Without a selected
    /// contact the transcript is just cleared.
    pub fn select_day(&mut self, day: u32) {
        let Some(date) = self.cursor.day(day) else {
            return;
        };
        self.selected_day = Some(date);
        self.events.push(ViewEvent::DaySelected(date));
        self.events.push(ViewEvent::TranscriptCleared);

        let Some(contact) = self.selected else {
            return;
        };
        let transcript = render_day(&self.source, &self.roster, contact, date);
        if let Some(flags) = transcript.last_flags {
            self.conversation_flags = flags;
        }
        for entry in transcript.entries {
            self.events.push(ViewEvent::TranscriptAppended {
                text: format!("{}{}", entry.text.text, RULE),
                flags: entry.text.flags,
            });
        }
    }

    pub fn next_month(&mut self) {
        self.cursor.next_month();
        self.refresh_month();
    }

    pub fn prev_month(&mut self) {
        self.cursor.prev_month();
        self.refresh_month();
    }

    pub fn next_year(&mut self) {
        self.cursor.next_year();
        self.refresh_month();
    }

    pub fn prev_year(&mut self) {
        self.cursor.prev_year();
        self.refresh_month();
    }

    // Rebuild the summary for the displayed month, then select its latest
    // log-bearing day, or day 1 when it has none.
    fn refresh_month(&mut self) {
        self.summary = match self.selected {
            Some(contact) => {
                summarize(&self.source, &self.roster, contact, self.cursor.year, self.cursor.month)
            }
            None => CalendarMonthSummary::empty(self.cursor.year, self.cursor.month),
        };
        self.events.push(ViewEvent::CalendarMarked(self.summary.clone()));
        let day = self.summary.latest_day.unwrap_or(1);
        self.select_day(day);
    }

    /// Start a new search, replacing any running one.
    ///
    /// The running search is stopped and its pending handles released, and the
    /// previous results are cleared, before the new scan starts. An empty term
    /// only does the stopping and clearing.
    pub fn start_search(&mut self, term: &str) {
        self.stop_search();
        self.results.clear(&self.source);
        self.events.push(ViewEvent::SearchResultsCleared);
        self.cancel.reset();

        if term.is_empty() {
            return;
        }
        let task = SearchTask::new(term, self.cancel.clone())
            .with_date_format(&self.config.date_format);
        self.events.push(ViewEvent::SearchStarted { term: term.to_string() });
        self.search = Some(task);
    }

    /// Advance the running search by one log; returns whether it is still running
    pub fn pump_search(&mut self) -> bool {
        let Some(task) = self.search.as_mut() else {
            return false;
        };

        match task.step(&self.source, &self.roster) {
            SearchStep::Matched(found) => {
                let alias = found.alias.clone();
                let date = found.date.clone();
                let index = self.results.insert_most_recent_first(&self.source, found);
                self.events.push(ViewEvent::SearchResultInserted { index, alias, date });
                if self.config.result_limit().is_some_and(|limit| self.results.len() >= limit) {
                    debug!(limit = self.results.len(), "Search result limit reached");
                    self.cancel.cancel();
                }
                true
            }
            SearchStep::Scanned => true,
            SearchStep::Finished(outcome) => {
                self.events.push(ViewEvent::SearchFinished {
                    outcome,
                    matches: task.matches(),
                    inspected: task.inspected(),
                });
                self.search = None;
                false
            }
        }
    }

    /// Ask the running search to stop; it unwinds on the next pump
    pub fn cancel_search(&mut self) {
        self.cancel.cancel();
    }

    /// Read the log of a retained result and queue its text.
    ///
    /// Returns `false` when there is no result at `index`.
    pub fn open_search_result(&mut self, index: usize) -> bool {
        let Some(found) = self.results.get(index) else {
            return false;
        };
        let text = read_or_empty(&self.source, &found.log);
        self.search_flags = text.flags;
        self.events.push(ViewEvent::SearchTranscript { text: text.text, flags: text.flags });
        true
    }

    fn stop_search(&mut self) {
        if let Some(mut task) = self.search.take() {
            self.cancel.cancel();
            task.abort(&self.source);
        }
    }
}

impl<S: LogSource> Drop for LogViewer<S> {
    fn drop(&mut self) {
        self.stop_search();
        self.results.clear(&self.source);
    }
}
