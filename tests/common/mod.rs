//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use purple_log_explorer::models::{Account, LogKind};
use purple_log_explorer::parsers::{LogFormat, format_log_file_name};
use purple_log_explorer::source::PurpleLogDir;
use tempfile::TempDir;

/// Builder for creating test .purple directory structures
pub struct PurpleDirBuilder {
    temp_dir: TempDir,
}

impl PurpleDirBuilder {
    /// Create a new builder with an empty .purple directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the .purple directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write blist.xml from a roster builder
    pub fn with_blist(self, blist: &BlistBuilder) -> Self {
        self.with_file("blist.xml", &blist.to_xml())
    }

    /// Write any file relative to the .purple directory
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
        self
    }

    /// Add an HTML log; the header line is generated
    pub fn with_html_log(self, log: &LogFileBuilder) -> Self {
        log.create_in(self.temp_dir.path(), LogFormat::Html);
        self
    }

    /// Add a plain text log; the header line is generated
    pub fn with_text_log(self, log: &LogFileBuilder) -> Self {
        log.create_in(self.temp_dir.path(), LogFormat::Text);
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for PurpleDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one conversation log file
pub struct LogFileBuilder {
    protocol: String,
    account: String,
    buddy: String,
    started: NaiveDateTime,
    body: String,
}

impl LogFileBuilder {
    pub fn new(protocol: &str, account: &str, buddy: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            account: account.to_string(),
            buddy: buddy.to_string(),
            started: at(2023, 5, 1, 14, 0),
            body: "Test message".to_string(),
        }
    }

    pub fn started(mut self, started: NaiveDateTime) -> Self {
        self.started = started;
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    fn create_in(&self, purple_dir: &Path, format: LogFormat) {
        let store = PurpleLogDir::open(purple_dir).expect("Failed to open purple dir");
        let account = Account::new(&self.protocol, &self.account);
        let dir = store.buddy_dir(LogKind::Im, &self.buddy, &account);
        fs::create_dir_all(&dir).expect("Failed to create buddy dir");

        let header = match format {
            LogFormat::Html => format!(
                "<html><head><title>Conversation with {}</title></head><body><h3>Conversation with {}</h3>",
                self.buddy, self.buddy
            ),
            LogFormat::Text => format!("Conversation with {} at {}", self.buddy, self.started),
        };
        let name = format_log_file_name(self.started, "-0400EDT", format);
        fs::write(dir.join(name), format!("{}\n{}\n", header, self.body))
            .expect("Failed to write log");
    }
}

/// Builder for blist.xml
#[derive(Default)]
pub struct BlistBuilder {
    contacts: Vec<(String, Vec<(String, String, String)>)>,
}

impl BlistBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact; buddies are (protocol, account, name)
    pub fn contact(mut self, alias: &str, buddies: &[(&str, &str, &str)]) -> Self {
        let buddies = buddies
            .iter()
            .map(|(proto, account, name)| (proto.to_string(), account.to_string(), name.to_string()))
            .collect();
        self.contacts.push((alias.to_string(), buddies));
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version='1.0' encoding='UTF-8' ?>\n<purple version='1.0'>\n<blist>\n<group name='Buddies'>\n",
        );
        for (alias, buddies) in &self.contacts {
            xml.push_str(&format!("<contact alias='{}'>\n", alias));
            for (proto, account, name) in buddies {
                xml.push_str(&format!(
                    "<buddy account='{}' proto='{}'><name>{}</name></buddy>\n",
                    account, proto, name
                ));
            }
            xml.push_str("</contact>\n");
        }
        xml.push_str("</group>\n</blist>\n</purple>\n");
        xml
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("Invalid test date")
}

/// The two-buddy Alice fixture: logs on 1 and 2 May 2023 plus one for Bob
pub fn alice_and_bob() -> TempDir {
    PurpleDirBuilder::new()
        .with_blist(
            &BlistBuilder::new()
                .contact(
                    "Alice",
                    &[
                        ("prpl-jabber", "me@example.org/Home", "alice@example.org"),
                        ("prpl-irc", "me", "alice_"),
                    ],
                )
                .contact("Bob", &[("prpl-jabber", "me@example.org/Home", "bob@example.org")]),
        )
        .with_html_log(
            &LogFileBuilder::new("prpl-jabber", "me@example.org/Home", "alice@example.org")
                .started(at(2023, 5, 1, 14, 0))
                .body("<font size=\"2\">(14:00:05)</font> <b>alice:</b> meeting notes<br/>"),
        )
        .with_text_log(
            &LogFileBuilder::new("prpl-irc", "me", "alice_")
                .started(at(2023, 5, 2, 9, 30))
                .body("(09:30:00) alice_: see you tomorrow"),
        )
        .with_html_log(
            &LogFileBuilder::new("prpl-jabber", "me@example.org/Home", "bob@example.org")
                .started(at(2023, 4, 20, 18, 0))
                .body("<b>bob:</b> say hi to Alice<br/>"),
        )
        .build()
}
