use std::path::Path;

use chrono::NaiveDateTime;

// "2023-05-01.143000" is the fixed-width prefix of every log file name
const STAMP_FORMAT: &str = "%Y-%m-%d.%H%M%S";
const STAMP_LEN: usize = 17;

/// On-disk format of one log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Html,
    Text,
}

impl LogFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "txt",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "html" | "htm" => Some(Self::Html),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Parse the start time out of a log file name.
///
/// Names look like `2023-05-01.143000-0400EDT.html`: a local date and time,
/// then an optional UTC offset and zone abbreviation. The local part is the
/// civil breakdown the log was written with, so the suffix is ignored.
pub fn parse_log_file_name(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name.get(..STAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}

/// Build a log file name for a start time (used when writing fixtures)
pub fn format_log_file_name(started: NaiveDateTime, offset: &str, format: LogFormat) -> String {
    format!("{}{}.{}", started.format(STAMP_FORMAT), offset, format.extension())
}
