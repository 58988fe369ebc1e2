//! Parsers for the messaging client's on-disk formats
//!
//! # Error Handling Strategy
//!
//! - **Log file names**: A name that does not carry a timestamp is not an error;
//!   [`parse_log_file_name`] returns `None` and the caller falls back to the file's
//!   modification time.
//!
//! - **Markup**: [`strip_html`] never fails. It renders through `html2text`, which
//!   keeps unknown entities and stray `<` as literal text; if rendering itself
//!   fails the markup is returned verbatim with a warning.
//!
//! - **Buddy list**: A malformed `blist.xml` is an error with the byte position
//!   attached. Entries that are well-formed but incomplete (a buddy without a
//!   name, a contact without buddies) are skipped with a debug log.

pub mod blist;
pub mod log_name;
pub mod markup;

pub use blist::{load_blist_file, parse_blist};
pub use log_name::{LogFormat, format_log_file_name, parse_log_file_name};
pub use markup::{escape_html, strip_html, to_plain_text};
