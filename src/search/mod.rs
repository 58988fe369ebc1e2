//! Cancellable full-text search across every log in the roster
//!
//! A search is a [`SearchTask`] driven one log at a time by its caller, so an
//! interactive loop can handle input between logs and cancel through a
//! [`CancelFlag`]. Matches are streamed as they are found; each carries the
//! handle of the matching log, which the caller keeps in [`SearchResults`].
//!
//! # Error Handling Strategy
//!
//! - **Empty term**: not an error. The task is finished before it starts.
//!
//! - **Unreadable log**: searched as empty text, logged at `warn`, released.
//!
//! - **Cancellation**: a normal way for a search to end
//!   ([`SearchOutcome::Cancelled`]). Matches found before the cancel stay valid.

pub mod cancel;
pub mod engine;
pub mod results;

pub use cancel::CancelFlag;
pub use engine::{DEFAULT_DATE_FORMAT, Search, SearchOutcome, SearchStep, SearchTask};
pub use results::SearchResults;
