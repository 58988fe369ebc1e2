//! Per-contact views over the log store
//!
//! # Error Handling Strategy
//!
//! Nothing in this module returns an error. The log store is read through
//! [`read_or_empty`](crate::source::read_or_empty), so a log that cannot be read
//! contributes empty text and the rest of the view is still built:
//!
//! - **Unknown contact**: collecting, summarizing or rendering for a contact id
//!   that is not in the roster yields an empty result.
//!
//! - **Unreadable log**: the log's text is empty and a warning is logged. Its
//!   handle is released like any other.
//!
//! - **Handle release**: [`LogCollection`] gives every handle it still holds back
//!   to the source when it is dropped, so early returns cannot leak handles.

pub mod calendar;
pub mod contacts;
pub mod merger;
pub mod stats;

pub use calendar::{CalendarCursor, CalendarMonthSummary, latest_log_date, summarize};
pub use contacts::{ContactEntry, ContactFilter, build_contact_list};
pub use merger::{LogCollection, RULE, Transcript, TranscriptEntry, render_day};
pub use stats::{CorpusStats, compute_stats};
