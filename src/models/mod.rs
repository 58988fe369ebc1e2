//! Data models for instant-messaging conversation logs.
//!
//! This module defines the data structures shared by the engine and its surfaces:
//!
//! - [`LogHandle`] - Opaque reference to one stored conversation log
//! - [`LogText`] / [`ReadFlags`] - Materialized log content and its rendering quirks
//! - [`Roster`] / [`Contact`] / [`Buddy`] - Who the logs belong to
//! - [`SearchMatch`] - One full-text search hit, owning its log handle
//!
//! Log handles are deliberately not `Clone`: every handle handed out by a
//! [`LogSource`](crate::source::LogSource) is moved back into
//! [`LogSource::release`](crate::source::LogSource::release) exactly once.

pub mod log;
pub mod roster;
pub mod search;

pub use log::{Account, LogHandle, LogKind, LogText, LogTimestamp, ReadFlags, format_log_date};
pub use roster::{Buddy, Contact, ContactId, Roster};
pub use search::SearchMatch;
