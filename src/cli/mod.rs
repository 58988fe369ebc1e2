//! Command-line interface
//!
//! Every subcommand opens the purple directory, loads the roster and viewer
//! configuration, and then works on the [`crate::source::PurpleLogDir`] store.
//! Running without a subcommand opens the interactive browser.
//!
//! # Error Handling Strategy
//!
//! Setup failures (missing directory, malformed `blist.xml`, invalid config)
//! are returned to `main` with context and end the process with a failure
//! status. Unreadable individual logs never fail a command; they show up as
//! empty text and a `warn!` record.

pub mod commands;

pub use commands::{Cli, Commands, run};
