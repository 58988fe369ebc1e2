//! In-memory log source.
//!
//! Keeps every log in a `Vec` and counts how many handles were issued, read and
//! released, so callers can check that no handle leaks across a code path.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anyhow::{Result, bail};
use chrono::NaiveDateTime;

use super::LogSource;
use crate::models::{Account, LogHandle, LogKind, LogText, LogTimestamp, ReadFlags};

#[derive(Debug)]
struct StoredLog {
    key: String,
    kind: LogKind,
    name: String,
    account: Account,
    timestamp: LogTimestamp,
    content: Option<LogText>,
}

/// Log source backed by memory, with handle accounting
#[derive(Debug, Default)]
pub struct MemoryLogSource {
    logs: Vec<StoredLog>,
    issued: Cell<usize>,
    released: Cell<usize>,
    reads: Cell<usize>,
    outstanding: RefCell<HashMap<String, usize>>,
    over_released: Cell<usize>,
}

impl MemoryLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an IM log with plain text content; returns its key
    pub fn add(
        &mut self,
        account: &Account,
        name: &str,
        when: NaiveDateTime,
        text: &str,
    ) -> String {
        self.insert(
            LogKind::Im,
            account,
            name,
            LogTimestamp::Breakdown(when),
            Some(LogText::new(text, ReadFlags::empty())),
        )
    }

    /// Store an IM log whose text carries explicit read flags
    pub fn add_with_flags(
        &mut self,
        account: &Account,
        name: &str,
        when: NaiveDateTime,
        text: &str,
        flags: ReadFlags,
    ) -> String {
        self.insert(
            LogKind::Im,
            account,
            name,
            LogTimestamp::Breakdown(when),
            Some(LogText::new(text, flags)),
        )
    }

    /// Store an IM log whose only timestamp is a raw epoch value
    pub fn add_epoch(&mut self, account: &Account, name: &str, epoch: i64, text: &str) -> String {
        self.insert(
            LogKind::Im,
            account,
            name,
            LogTimestamp::Epoch(epoch),
            Some(LogText::new(text, ReadFlags::empty())),
        )
    }

    /// Store an IM log that fails every read
    pub fn add_unreadable(&mut self, account: &Account, name: &str, when: NaiveDateTime) -> String {
        self.insert(LogKind::Im, account, name, LogTimestamp::Breakdown(when), None)
    }

    /// Store a log of an arbitrary kind
    pub fn insert(
        &mut self,
        kind: LogKind,
        account: &Account,
        name: &str,
        timestamp: LogTimestamp,
        content: Option<LogText>,
    ) -> String {
        let key = format!("mem-{}", self.logs.len());
        self.logs.push(StoredLog {
            key: key.clone(),
            kind,
            name: name.to_string(),
            account: account.clone(),
            timestamp,
            content,
        });
        key
    }

    /// Number of stored logs
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Handles handed out so far
    pub fn issued(&self) -> usize {
        self.issued.get()
    }

    /// Handles given back so far
    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Successful and failed reads so far
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Handles currently held by callers
    pub fn outstanding(&self) -> usize {
        self.outstanding.borrow().values().sum()
    }

    /// Releases of handles that were not outstanding
    pub fn over_released(&self) -> usize {
        self.over_released.get()
    }
}

impl LogSource for MemoryLogSource {
    fn logs(&self, kind: LogKind, name: &str, account: &Account) -> Vec<LogHandle> {
        let handles: Vec<LogHandle> = self
            .logs
            .iter()
            .filter(|log| log.kind == kind && log.name == name && &log.account == account)
            .map(|log| {
                LogHandle::new(
                    log.key.clone(),
                    log.kind,
                    log.name.clone(),
                    log.account.clone(),
                    log.timestamp,
                )
            })
            .collect();

        self.issued.set(self.issued.get() + handles.len());
        let mut outstanding = self.outstanding.borrow_mut();
        for handle in &handles {
            *outstanding.entry(handle.key().to_string()).or_insert(0) += 1;
        }
        handles
    }

    fn read(&self, log: &LogHandle) -> Result<LogText> {
        self.reads.set(self.reads.get() + 1);
        let Some(stored) = self.logs.iter().find(|stored| stored.key == log.key()) else {
            bail!("Unknown log: {}", log.key());
        };
        match &stored.content {
            Some(content) => Ok(content.clone()),
            None => bail!("Log is unreadable: {}", log.key()),
        }
    }

    fn release(&self, log: LogHandle) {
        self.released.set(self.released.get() + 1);
        let mut outstanding = self.outstanding.borrow_mut();
        match outstanding.get_mut(log.key()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => self.over_released.set(self.over_released.get() + 1),
        }
    }
}
