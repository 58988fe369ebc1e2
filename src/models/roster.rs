use serde::{Deserialize, Serialize};

use super::log::Account;

/// Opaque reference to a contact within a [`Roster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub(crate) usize);

impl ContactId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One roster entry: a single (account, name) identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buddy {
    pub account: Account,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl Buddy {
    pub fn new(account: Account, name: impl Into<String>) -> Self {
        Self { account, name: name.into(), alias: None }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The buddy's alias, or its name when no alias is set
    pub fn display_alias(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.name,
        }
    }
}

/// A named grouping of buddies that are the same person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub alias: String,
    pub buddies: Vec<Buddy>,
}

impl Contact {
    pub fn new(alias: impl Into<String>, buddies: Vec<Buddy>) -> Self {
        Self { alias: alias.into(), buddies }
    }

    /// The contact alias, falling back to the first buddy's alias when empty
    pub fn display_alias(&self) -> &str {
        if !self.alias.is_empty() {
            return &self.alias;
        }
        self.buddies.first().map(Buddy::display_alias).unwrap_or("")
    }
}

/// The full buddy list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    contacts: Vec<Contact>,
}

impl Roster {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn push(&mut self, contact: Contact) -> ContactId {
        self.contacts.push(contact);
        ContactId(self.contacts.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(id.0)
    }

    /// All contacts with their ids, in roster order
    pub fn contacts(&self) -> impl Iterator<Item = (ContactId, &Contact)> {
        self.contacts.iter().enumerate().map(|(idx, contact)| (ContactId(idx), contact))
    }

    /// Every buddy in the roster together with its parent contact
    pub fn buddies(&self) -> impl Iterator<Item = (ContactId, &Contact, &Buddy)> {
        self.contacts()
            .flat_map(|(id, contact)| contact.buddies.iter().map(move |buddy| (id, contact, buddy)))
    }

    /// Total number of buddies across all contacts
    pub fn buddy_count(&self) -> usize {
        self.contacts.iter().map(|c| c.buddies.len()).sum()
    }

    /// Find a contact by display alias (case-insensitive exact match)
    pub fn find_by_alias(&self, alias: &str) -> Option<ContactId> {
        let wanted = alias.to_lowercase();
        self.contacts()
            .find(|(_, contact)| contact.display_alias().to_lowercase() == wanted)
            .map(|(id, _)| id)
    }
}
