//! Purple Log Explorer - Browse and search instant messaging logs
//!
//! This library reads the conversation logs a libpurple-style messaging client
//! keeps under `~/.purple/logs` and the buddy list in `~/.purple/blist.xml`. It
//! supports:
//!
//! - Merging the logs of every buddy of a contact into one chronological list
//! - Marking the days of a month that have logs and rendering one day
//! - Case-insensitive full-text search across all logs, run in small
//!   cancellable steps
//! - A browsing session ([`viewer::LogViewer`]) shared by the CLI and TUI
//!
//! # Example
//!
//! ```no_run
//! use purple_log_explorer::indexer::render_day;
//! use purple_log_explorer::source::PurpleLogDir;
//! use chrono::NaiveDate;
//!
//! let store = PurpleLogDir::open("/home/alice/.purple")?;
//! let roster = store.load_roster()?;
//! if let Some(bob) = roster.find_by_alias("Bob") {
//!     let day = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
//!     println!("{}", render_day(&store, &roster, bob, day).to_plain_text());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod search;
pub mod source;
pub mod tui;
pub mod utils;
pub mod viewer;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use models::{ContactId, LogHandle, Roster, SearchMatch};
pub use source::{LogSource, PurpleLogDir};
pub use utils::paths::{escape_filename, format_path_with_tilde, unescape_filename};
pub use viewer::LogViewer;
