use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::indexer::{
    CalendarCursor, ContactEntry, ContactFilter, build_contact_list, compute_stats,
    latest_log_date, render_day, summarize,
};
use crate::models::{ContactId, Roster};
use crate::parsers::to_plain_text;
use crate::search::{CancelFlag, Search, SearchResults, SearchTask};
use crate::source::{LogSource, PurpleLogDir};
use crate::tui::run_interactive;
use crate::utils::{format_path_with_tilde, get_purple_dir, sanitize_for_terminal};
use crate::viewer::LogViewer;

#[derive(Parser)]
#[command(name = "purple-log-explorer")]
#[command(version)]
#[command(about = "Browse and search instant messaging logs", long_about = None)]
pub struct Cli {
    /// Messaging client data directory (defaults to ~/.purple)
    #[arg(long, global = true, env = "PURPLE_HOME")]
    pub purple_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List contacts that have logs
    Contacts {
        /// Only contacts whose alias starts with this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show the days of a month that have logs
    Calendar {
        /// Contact alias, or an unambiguous prefix of one
        contact: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Print a contact's conversation for one day
    Show {
        /// Contact alias, or an unambiguous prefix of one
        contact: String,
        /// Day to show as YYYY-MM-DD (defaults to the most recent log)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Search every log for a term (case-insensitive)
    Search {
        term: String,
        /// Stop after this many matches
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show statistics about the logs
    Stats,
    /// Open the interactive browser (the default)
    Tui,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(cli.verbose, interactive);

    let purple_dir = match &cli.purple_dir {
        Some(dir) => dir.clone(),
        None => get_purple_dir()?,
    };
    let source = PurpleLogDir::open(&purple_dir)?;
    let roster = source.load_roster()?;
    let config = ViewerConfig::load(&purple_dir)?;
    info!(dir = %purple_dir.display(), contacts = roster.len(), "Opened purple directory");

    match cli.command {
        Some(Commands::Contacts { filter }) => list_contacts(&source, &roster, filter.as_deref()),
        Some(Commands::Calendar { contact, year, month }) => {
            show_calendar(&source, &roster, &contact, year, month)
        }
        Some(Commands::Show { contact, date }) => show_day(&source, &roster, &contact, date),
        Some(Commands::Search { term, limit }) => {
            search_logs(&source, &roster, &config, &term, limit)
        }
        Some(Commands::Stats) => show_stats(&source, &roster),
        Some(Commands::Tui) | None => run_interactive(LogViewer::open(source, roster, config)),
    }
}

/// Install a stderr subscriber. The TUI owns the terminal, so it only logs
/// when RUST_LOG asks for it.
fn init_logging(verbose: bool, interactive: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    if interactive && std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let default_filter = if verbose { "purple_log_explorer=debug,warn" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Find a contact by exact alias (ignoring case), then by unique prefix
fn resolve_contact(roster: &Roster, contacts: &[ContactEntry], query: &str) -> Result<ContactId> {
    if let Some(id) = roster.find_by_alias(query) {
        return Ok(id);
    }

    let filter = ContactFilter::new(query);
    let candidates: Vec<&ContactEntry> = filter.apply(contacts).collect();
    match candidates.as_slice() {
        [] => bail!("No contact matching '{}'", query),
        [only] => Ok(only.id),
        many => {
            let aliases: Vec<&str> = many.iter().map(|entry| entry.alias.as_str()).collect();
            bail!("Contact '{}' is ambiguous: {}", query, aliases.join(", "))
        }
    }
}

fn list_contacts<S: LogSource>(source: &S, roster: &Roster, filter: Option<&str>) -> Result<()> {
    let contacts = build_contact_list(source, roster);
    let filter = ContactFilter::new(filter.unwrap_or(""));
    for entry in filter.apply(&contacts) {
        println!("{}", sanitize_for_terminal(&entry.alias));
    }
    Ok(())
}

fn show_calendar<S: LogSource>(
    source: &S,
    roster: &Roster,
    query: &str,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let contacts = build_contact_list(source, roster);
    let contact = resolve_contact(roster, &contacts, query)?;

    let anchor = latest_log_date(source, roster, contact).unwrap_or_else(|| Local::now().date_naive());
    let cursor = CalendarCursor::new(
        year.unwrap_or_else(|| anchor.year()),
        month.unwrap_or_else(|| anchor.month()),
    );
    let summary = summarize(source, roster, contact, cursor.year, cursor.month);

    println!("{}", cursor.first_day().format("%B %Y"));
    if summary.is_empty() {
        println!("No logs");
        return Ok(());
    }
    for day in &summary.days {
        if let Some(date) = cursor.day(*day) {
            let marker = if summary.latest_day == Some(*day) { " *" } else { "" };
            println!("{}{}", date.format("%Y-%m-%d %a"), marker);
        }
    }
    Ok(())
}

fn show_day<S: LogSource>(
    source: &S,
    roster: &Roster,
    query: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let contacts = build_contact_list(source, roster);
    let contact = resolve_contact(roster, &contacts, query)?;
    let alias = roster.contact(contact).map(|c| c.display_alias()).unwrap_or(query);

    let date = match date {
        Some(date) => date,
        None => latest_log_date(source, roster, contact)
            .with_context(|| format!("No logs for {}", alias))?,
    };
    debug!(%date, contact = contact.index(), "Rendering day");

    let transcript = render_day(source, roster, contact, date);
    if transcript.is_empty() {
        println!("No logs for {} on {}", sanitize_for_terminal(alias), date);
        return Ok(());
    }

    for entry in &transcript.entries {
        println!(
            "── {} ({}) {} ──",
            sanitize_for_terminal(&entry.buddy),
            sanitize_for_terminal(&entry.account.username),
            entry.started.format("%Y-%m-%d %H:%M:%S")
        );
        let markup = sanitize_for_terminal(&entry.text.text);
        println!("{}", sanitize_for_terminal(&to_plain_text(&markup, entry.text.flags)));
    }
    Ok(())
}

fn search_logs<S: LogSource>(
    source: &S,
    roster: &Roster,
    config: &ViewerConfig,
    term: &str,
    limit: Option<usize>,
) -> Result<()> {
    if term.is_empty() {
        bail!("Search term must not be empty");
    }

    let task = SearchTask::new(term, CancelFlag::new()).with_date_format(&config.date_format);
    let limit = limit.or(config.result_limit()).unwrap_or(usize::MAX);
    let mut search = Search::new(task, source, roster);

    let mut results = SearchResults::new();
    for hit in search.by_ref().take(limit) {
        results.insert_most_recent_first(source, hit);
    }
    let inspected = search.task().inspected();
    drop(search);

    for hit in results.iter() {
        println!("{}\t{}", hit.date, sanitize_for_terminal(&hit.alias));
    }
    eprintln!("{} matches in {} logs", results.len(), inspected);
    results.clear(source);
    Ok(())
}

fn show_stats(source: &PurpleLogDir, roster: &Roster) -> Result<()> {
    let stats = compute_stats(source, roster);

    println!("Purple Log Statistics");
    println!("=====================");
    println!("Contacts: {} ({} with logs)", stats.contacts, stats.contacts_with_logs);
    println!("Buddies: {}", stats.buddies);
    println!("Logs: {}", stats.logs);
    for (protocol, count) in &stats.protocols {
        println!("  {}: {}", sanitize_for_terminal(protocol), count);
    }
    if let Some(first) = stats.first_day {
        println!("Oldest log: {}", first);
    }
    if let Some(last) = stats.last_day {
        println!("Newest log: {}", last);
    }
    println!();
    println!("Purple directory: {}", format_path_with_tilde(source.root()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Buddy, Contact};

    fn roster_and_contacts() -> (Roster, Vec<ContactEntry>) {
        let account = Account::new("prpl-jabber", "me@example.org");
        let mut roster = Roster::default();
        let mut contacts = Vec::new();
        for alias in ["Alice", "Alan", "Bob"] {
            let buddy = Buddy::new(account.clone(), format!("{}@example.org", alias));
            let id = roster.push(Contact::new(alias, vec![buddy]));
            contacts.push(ContactEntry { id, alias: alias.to_string() });
        }
        (roster, contacts)
    }

    #[test]
    fn test_resolve_contact_exact_alias() {
        let (roster, contacts) = roster_and_contacts();
        let id = resolve_contact(&roster, &contacts, "alice").unwrap();
        assert_eq!(roster.contact(id).unwrap().alias, "Alice");
    }

    #[test]
    fn test_resolve_contact_unique_prefix() {
        let (roster, contacts) = roster_and_contacts();
        let id = resolve_contact(&roster, &contacts, "b").unwrap();
        assert_eq!(roster.contact(id).unwrap().alias, "Bob");
    }

    #[test]
    fn test_resolve_contact_ambiguous_or_missing() {
        let (roster, contacts) = roster_and_contacts();
        let err = resolve_contact(&roster, &contacts, "al").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert!(err.to_string().contains("Alice, Alan") || err.to_string().contains("Alan, Alice"));

        let err = resolve_contact(&roster, &contacts, "zed").unwrap_err();
        assert!(err.to_string().contains("No contact matching"));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["purple-log-explorer", "--purple-dir", "/tmp/p", "search", "hi", "-n", "3"]);
        assert_eq!(cli.purple_dir, Some(PathBuf::from("/tmp/p")));
        assert!(matches!(cli.command, Some(Commands::Search { ref term, limit: Some(3) }) if term == "hi"));

        let cli = Cli::parse_from(["purple-log-explorer", "show", "Alice", "--date", "2023-05-01"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Show { date: Some(d), .. }) if d == NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
        ));

        let cli = Cli::parse_from(["purple-log-explorer"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_month() {
        let result = Cli::try_parse_from(["purple-log-explorer", "calendar", "Alice", "--month", "13"]);
        assert!(result.is_err());
    }
}
