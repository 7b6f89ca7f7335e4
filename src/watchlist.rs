// src/watchlist.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store;

/// On-disk shape: `{"chats": {"<chat_id>": ["BBCA.JK", ...]}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Watchlists {
    #[serde(default)]
    pub chats: BTreeMap<i64, Vec<String>>,
}

/// Per-chat ticker subscriptions, whole-file reads and atomic writes.
/// The document is small enough that load-per-access beats caching.
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Watchlists {
        store::load_or_default(&self.path)
    }

    pub fn save(&self, lists: &Watchlists) -> Result<()> {
        store::save_atomic(&self.path, lists)
    }

    /// Snapshot of every chat's subscriptions, keyed by chat id ascending.
    pub fn get_all(&self) -> BTreeMap<i64, Vec<String>> {
        self.load().chats
    }

    pub fn get(&self, chat_id: i64) -> Vec<String> {
        self.load().chats.get(&chat_id).cloned().unwrap_or_default()
    }

    pub fn set(&self, chat_id: i64, tickers: Vec<String>) -> Result<()> {
        let mut lists = self.load();
        lists.chats.insert(chat_id, tickers);
        self.save(&lists)
    }
}

/// `bbca` -> `BBCA.JK`; an explicit exchange suffix is preserved.
pub fn normalize_idx_ticker(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code.ends_with(".JK") {
        code
    } else {
        format!("{code}.JK")
    }
}

/// `BBCA.JK` -> `BBCA`. Feed queries and ledger keys use the bare code.
pub fn code_only(ticker: &str) -> String {
    ticker.trim().to_uppercase().replace(".JK", "")
}
