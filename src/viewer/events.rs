use chrono::NaiveDate;

use crate::indexer::CalendarMonthSummary;
use crate::models::{ContactId, ReadFlags};
use crate::search::SearchOutcome;

/// Something the display surface should reflect.
///
/// The session queues events as it changes state; the surface drains them with
/// [`LogViewer::drain_events`](super::LogViewer::drain_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A contact with logs, in list order
    ContactListed { contact: ContactId, alias: String },
    /// The month on display and its log-bearing days
    CalendarMarked(CalendarMonthSummary),
    DaySelected(NaiveDate),
    TranscriptCleared,
    /// One log of the selected day, as markup ending in a rule
    TranscriptAppended { text: String, flags: ReadFlags },
    SearchStarted { term: String },
    SearchResultsCleared,
    /// A match was retained at `index`; rows from `index` on move down one.
    /// Results are kept most recent first.
    SearchResultInserted { index: usize, alias: String, date: String },
    SearchFinished { outcome: SearchOutcome, matches: usize, inspected: usize },
    /// Full text of an opened search result
    SearchTranscript { text: String, flags: ReadFlags },
}
