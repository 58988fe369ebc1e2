use std::fmt::Write as _;

use bitflags::bitflags;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a stored log, mirroring the client's log directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    Im,
    Chat,
    System,
}

/// One messaging account: a protocol plus the local username on it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Account {
    pub protocol: String,
    pub username: String,
}

impl Account {
    /// Create an account, dropping the `prpl-` prefix used by roster files
    pub fn new(protocol: &str, username: &str) -> Self {
        let protocol = protocol.strip_prefix("prpl-").unwrap_or(protocol);
        Self { protocol: protocol.to_string(), username: username.to_string() }
    }
}

/// When a log was started.
///
/// Log stores either know the civil breakdown directly (parsed from the log's
/// name) or only a raw epoch value, which is resolved in the local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTimestamp {
    Breakdown(NaiveDateTime),
    Epoch(i64),
}

impl LogTimestamp {
    /// Resolve to a civil date and time
    pub fn civil(&self) -> NaiveDateTime {
        match *self {
            Self::Breakdown(datetime) => datetime,
            Self::Epoch(secs) => DateTime::from_timestamp(secs, 0)
                .map(|utc| utc.with_timezone(&Local).naive_local())
                .unwrap_or(DateTime::<Utc>::MIN_UTC.naive_utc()),
        }
    }

    /// Resolve to the calendar day the log belongs to
    pub fn date(&self) -> NaiveDate {
        self.civil().date()
    }
}

bitflags! {
    /// Quirks of a log's stored text that affect how it is rendered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReadFlags: u32 {
        /// Raw newlines in the text are not line breaks; breaks are in the markup.
        const NO_NEWLINE = 1 << 0;
    }
}

/// Materialized content of one log
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogText {
    pub text: String,
    pub flags: ReadFlags,
}

impl LogText {
    pub fn new(text: impl Into<String>, flags: ReadFlags) -> Self {
        Self { text: text.into(), flags }
    }

    /// Stand-in for a log that could not be read
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Opaque reference to one stored conversation log.
///
/// Not `Clone`: whoever holds a handle is responsible for passing it back to
/// the source it came from.
#[derive(Debug, PartialEq, Eq)]
pub struct LogHandle {
    key: String,
    kind: LogKind,
    name: String,
    account: Account,
    timestamp: LogTimestamp,
}

impl LogHandle {
    pub fn new(
        key: impl Into<String>,
        kind: LogKind,
        name: impl Into<String>,
        account: Account,
        timestamp: LogTimestamp,
    ) -> Self {
        Self { key: key.into(), kind, name: name.into(), account, timestamp }
    }

    /// Source-specific identity of the stored log (a path, a row id, ...)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    /// Name of the buddy (or chat) the log is with
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn timestamp(&self) -> LogTimestamp {
        self.timestamp
    }
}

/// Format a log's start time with a strftime-style pattern.
///
/// An invalid pattern falls back to chrono's default rendering instead of panicking.
pub fn format_log_date(timestamp: LogTimestamp, pattern: &str) -> String {
    let civil = timestamp.civil();
    let mut formatted = String::new();
    if write!(formatted, "{}", civil.format(pattern)).is_err() {
        return civil.to_string();
    }
    formatted
}
