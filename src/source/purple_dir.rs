//! The messaging client's on-disk log tree.
//!
//! ```text
//! <purple dir>/
//!   blist.xml
//!   logs/<protocol>/<account>/<buddy>/2023-05-01.143000-0400EDT.html
//!   logs/<protocol>/<account>/<room>.chat/2023-05-01.150000.txt
//!   logs/<protocol>/<account>/.system/2023-05-01.090000.txt
//! ```
//!
//! Account and buddy directory names are normalized (lowercase, no resource) and
//! percent-escaped. Every log file starts with a one-line header that is not part
//! of the conversation.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::LogSource;
use crate::models::{
    Account, Buddy, Contact, LogHandle, LogKind, LogText, LogTimestamp, ReadFlags, Roster,
};
use crate::parsers::{LogFormat, escape_html, load_blist_file, parse_log_file_name};
use crate::utils::{escape_filename, normalize_name, unescape_filename, validate_file_size};

const BLIST_FILENAME: &str = "blist.xml";
const LOGS_DIRNAME: &str = "logs";
const CHAT_SUFFIX: &str = ".chat";
const SYSTEM_DIRNAME: &str = ".system";

/// Log source reading a purple configuration directory
#[derive(Debug, Clone)]
pub struct PurpleLogDir {
    root: PathBuf,
}

impl PurpleLogDir {
    /// Open a purple directory.
    ///
    /// The directory must exist. A missing `logs/` subdirectory is not an error:
    /// the source simply has no logs.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            bail!("Purple directory not found: {}", root.display());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIRNAME)
    }

    /// Directory holding the logs of `kind` with `name` on `account`
    pub fn buddy_dir(&self, kind: LogKind, name: &str, account: &Account) -> PathBuf {
        let account_dir = self
            .logs_dir()
            .join(escape_filename(&account.protocol))
            .join(escape_filename(&normalize_name(&account.username)));
        match kind {
            LogKind::Im => account_dir.join(escape_filename(&normalize_name(name))),
            LogKind::Chat => {
                account_dir.join(format!("{}{}", escape_filename(&normalize_name(name)), CHAT_SUFFIX))
            }
            LogKind::System => account_dir.join(SYSTEM_DIRNAME),
        }
    }

    /// The roster from `blist.xml`, or one derived from the log tree when the
    /// client never wrote a buddy list.
    ///
    /// # Errors
    ///
    /// Returns an error if `blist.xml` exists but cannot be read or parsed.
    pub fn load_roster(&self) -> Result<Roster> {
        let blist = self.root.join(BLIST_FILENAME);
        if blist.is_file() {
            return load_blist_file(&blist);
        }
        warn!(path = %blist.display(), "No buddy list found, deriving contacts from log directories");
        self.derive_roster()
    }

    /// One contact per IM buddy directory, named after the buddy.
    ///
    /// Directories are visited in file name order so the result is stable.
    pub fn derive_roster(&self) -> Result<Roster> {
        let logs_dir = self.logs_dir();
        let mut roster = Roster::default();
        if !logs_dir.is_dir() {
            return Ok(roster);
        }

        let walker = WalkDir::new(&logs_dir).min_depth(3).max_depth(3).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable log directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&logs_dir) else {
                continue;
            };
            let parts: Vec<String> =
                relative.iter().map(|part| part.to_string_lossy().into_owned()).collect();
            let [protocol, account, buddy] = parts.as_slice() else {
                continue;
            };
            if buddy == SYSTEM_DIRNAME || buddy.ends_with(CHAT_SUFFIX) {
                continue;
            }

            let account = Account::new(protocol, &unescape_filename(account));
            roster.push(Contact::new("", vec![Buddy::new(account, unescape_filename(buddy))]));
        }

        debug!(contacts = roster.len(), "Derived roster from log directories");
        Ok(roster)
    }

    fn log_timestamp(path: &Path, file_name: &str) -> Option<LogTimestamp> {
        if let Some(started) = parse_log_file_name(file_name) {
            return Some(LogTimestamp::Breakdown(started));
        }

        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
        Some(LogTimestamp::Epoch(i64::try_from(secs).ok()?))
    }
}

impl LogSource for PurpleLogDir {
    fn logs(&self, kind: LogKind, name: &str, account: &Account) -> Vec<LogHandle> {
        let dir = self.buddy_dir(kind, name, account);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            // Symlinks report as neither file nor dir here and are skipped
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .filter(|path| LogFormat::from_path(path).is_some())
            .collect();
        files.sort();

        files
            .into_iter()
            .filter_map(|path| {
                let file_name = path.file_name()?.to_string_lossy().into_owned();
                let Some(timestamp) = Self::log_timestamp(&path, &file_name) else {
                    warn!(path = %path.display(), "Skipping log without a usable timestamp");
                    return None;
                };
                Some(LogHandle::new(
                    path.to_string_lossy().into_owned(),
                    kind,
                    name,
                    account.clone(),
                    timestamp,
                ))
            })
            .collect()
    }

    fn read(&self, log: &LogHandle) -> Result<LogText> {
        let path = Path::new(log.key());
        let Some(format) = LogFormat::from_path(path) else {
            bail!("Not a log file: {}", path.display());
        };

        let mut file =
            File::open(path).with_context(|| format!("Failed to open log: {}", path.display()))?;
        validate_file_size(&file, path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read log: {}", path.display()))?;
        let contents = String::from_utf8_lossy(&bytes);

        // The first line is the "Conversation with ..." header; a log without a
        // newline is only a header
        let body = contents.split_once('\n').map_or("", |(_, rest)| rest);

        Ok(match format {
            LogFormat::Html => LogText::new(body, ReadFlags::NO_NEWLINE),
            LogFormat::Text => LogText::new(escape_html(body), ReadFlags::empty()),
        })
    }

    fn release(&self, log: LogHandle) {
        drop(log);
    }
}
