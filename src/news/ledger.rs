// src/news/ledger.rs
// Per-chat, per-ticker delivery history plus the `_meta` auto-news
// toggles. This document is the only "already delivered" truth the
// scheduler consults.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerMeta {
    #[serde(default)]
    pub autonews_chat: BTreeMap<String, bool>,
}

/// `{"<chat_id>": {"<CODE>": [url, ...]}, "_meta": {...}}`. Chat ids stay
/// string-keyed to match the document; `_meta` is a reserved key, never a
/// chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsLedger {
    #[serde(rename = "_meta", default)]
    pub meta: LedgerMeta,
    #[serde(flatten)]
    pub chats: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl NewsLedger {
    pub fn is_delivered(&self, chat_id: i64, code: &str, url: &str) -> bool {
        self.chats
            .get(&chat_id.to_string())
            .and_then(|tickers| tickers.get(code))
            .map(|urls| urls.iter().any(|u| u == url))
            .unwrap_or(false)
    }

    /// Append and evict the oldest entries past `cap`. The list stays FIFO
    /// by insertion, so re-delivery of evicted URLs is accepted behavior.
    pub fn record(&mut self, chat_id: i64, code: &str, url: &str, cap: usize) {
        let urls = self
            .chats
            .entry(chat_id.to_string())
            .or_default()
            .entry(code.to_string())
            .or_default();
        urls.push(url.to_string());
        if urls.len() > cap {
            let excess = urls.len() - cap;
            urls.drain(..excess);
        }
    }

    /// Per-chat auto-news toggle; a chat with no entry is enabled.
    pub fn autonews_enabled(&self, chat_id: i64) -> bool {
        self.meta
            .autonews_chat
            .get(&chat_id.to_string())
            .copied()
            .unwrap_or(true)
    }

    pub fn set_autonews(&mut self, chat_id: i64, enabled: bool) {
        self.meta.autonews_chat.insert(chat_id.to_string(), enabled);
    }

    pub fn history(&self, chat_id: i64, code: &str) -> Option<&Vec<String>> {
        self.chats
            .get(&chat_id.to_string())
            .and_then(|tickers| tickers.get(code))
    }
}

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> NewsLedger {
        store::load_or_default(&self.path)
    }

    pub fn save(&self, ledger: &NewsLedger) -> Result<()> {
        store::save_atomic(&self.path, ledger)
    }
}
