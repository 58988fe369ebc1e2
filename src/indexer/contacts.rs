//! The browsable contact list: every contact with at least one log.

use std::collections::HashSet;

use crate::models::{ContactId, LogKind, Roster};
use crate::source::LogSource;

/// One row of the contact list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEntry {
    pub id: ContactId,
    pub alias: String,
}

/// Contacts that have logs, sorted by alias in byte order.
///
/// Each buddy is probed for logs until its contact is known to have some; probed
/// handles are released immediately. A contact is listed once however many of
/// its buddies have logs.
pub fn build_contact_list<S: LogSource + ?Sized>(source: &S, roster: &Roster) -> Vec<ContactEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (id, contact, buddy) in roster.buddies() {
        if seen.contains(&id) {
            continue;
        }
        let probed = source.logs(LogKind::Im, &buddy.name, &buddy.account);
        let has_logs = !probed.is_empty();
        for log in probed {
            source.release(log);
        }
        if has_logs {
            seen.insert(id);
            entries.push(ContactEntry { id, alias: contact.display_alias().to_string() });
        }
    }

    entries.sort_by(|a, b| a.alias.cmp(&b.alias).then(a.id.cmp(&b.id)));
    entries
}

/// Case-insensitive alias prefix filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    text: String,
    folded: String,
}

impl ContactFilter {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string(), folded: text.to_lowercase() }
    }

    pub fn set(&mut self, text: &str) {
        *self = Self::new(text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn matches(&self, alias: &str) -> bool {
        self.folded.is_empty() || alias.to_lowercase().starts_with(&self.folded)
    }

    pub fn apply<'a>(
        &self,
        entries: &'a [ContactEntry],
    ) -> impl Iterator<Item = &'a ContactEntry> + use<'a> {
        let filter = self.clone();
        entries.iter().filter(move |entry| filter.matches(&entry.alias))
    }
}
