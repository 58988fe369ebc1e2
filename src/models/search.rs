use super::log::LogHandle;

/// One full-text search hit.
///
/// The match owns its log handle; the result set it lands in is responsible
/// for releasing it.
#[derive(Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub alias: String,
    pub date: String,
    pub log: LogHandle,
}
