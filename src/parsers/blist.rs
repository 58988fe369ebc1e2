//! Parser for the client's buddy list (`blist.xml`).
//!
//! Only the parts the log viewer needs are read:
//!
//! ```xml
//! <purple version='1.0'>
//!   <blist>
//!     <group name='Buddies'>
//!       <contact alias='Alice'>
//!         <buddy account='me@example.org/Home' proto='prpl-jabber'>
//!           <name>alice@example.org</name>
//!           <alias>Ali</alias>
//!         </buddy>
//!       </contact>
//!     </group>
//!   </blist>
//! </purple>
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::models::{Account, Buddy, Contact, Roster};

#[derive(Debug, Clone, Copy)]
enum BuddyField {
    Name,
    Alias,
}

#[derive(Debug, Default)]
struct PendingBuddy {
    account: Option<String>,
    protocol: Option<String>,
    name: Option<String>,
    alias: Option<String>,
}

impl PendingBuddy {
    fn into_buddy(self) -> Option<Buddy> {
        let name = self.name.filter(|n| !n.is_empty())?;
        let username = self.account?;
        let protocol = self.protocol.unwrap_or_default();
        let mut buddy = Buddy::new(Account::new(&protocol, &username), name);
        buddy.alias = self.alias;
        Some(buddy)
    }
}

/// Parse buddy list XML into a [`Roster`], keeping contacts in document order
pub fn parse_blist(xml: &str) -> Result<Roster> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut roster = Roster::default();
    let mut contact: Option<Contact> = None;
    let mut buddy: Option<PendingBuddy> = None;
    let mut field: Option<BuddyField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"contact" => {
                    let alias = attribute(&e, b"alias")?.unwrap_or_default();
                    contact = Some(Contact::new(alias, Vec::new()));
                }
                b"buddy" => {
                    buddy = Some(PendingBuddy {
                        account: attribute(&e, b"account")?,
                        protocol: attribute(&e, b"proto")?,
                        ..PendingBuddy::default()
                    });
                }
                b"name" if buddy.is_some() => field = Some(BuddyField::Name),
                b"alias" if buddy.is_some() => field = Some(BuddyField::Alias),
                _ => {}
            },
            Ok(Event::Text(text)) => {
                if let (Some(which), Some(pending)) = (field, buddy.as_mut()) {
                    let value = text.unescape()?.into_owned();
                    match which {
                        BuddyField::Name => pending.name = Some(value),
                        BuddyField::Alias => pending.alias = Some(value),
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"name" | b"alias" => field = None,
                b"buddy" => {
                    let parsed = buddy.take().and_then(PendingBuddy::into_buddy);
                    match (parsed, contact.as_mut()) {
                        (Some(parsed), Some(current)) => current.buddies.push(parsed),
                        _ => debug!("Skipping buddy entry without a name, account or contact"),
                    }
                }
                b"contact" => {
                    if let Some(finished) = contact.take() {
                        if finished.buddies.is_empty() {
                            debug!(alias = %finished.alias, "Skipping contact without buddies");
                        } else {
                            roster.push(finished);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => bail!("Malformed buddy list at byte {}: {}", reader.buffer_position(), e),
            _ => {}
        }
    }

    Ok(roster)
}

/// Read and parse a `blist.xml` file
pub fn load_blist_file(path: &Path) -> Result<Roster> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read buddy list: {}", path.display()))?;
    parse_blist(&xml).with_context(|| format!("Failed to parse buddy list: {}", path.display()))
}

fn attribute(element: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    match element.try_get_attribute(key)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
