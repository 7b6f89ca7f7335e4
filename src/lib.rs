// src/lib.rs
// Library surface for the bin targets and the integration tests.

pub mod bot;
pub mod config;
pub mod fmtnum;
pub mod market;
pub mod news;
pub mod store;
pub mod telemetry;
pub mod watchlist;

pub use crate::news::autonews::{
    compose_message, spawn_auto_news, AutoNews, AutoNewsCfg, ChatSink, RunStats,
};
pub use crate::news::fetch::{fetch_candidates, Candidate, FetchCfg};
pub use crate::news::ledger::{LedgerStore, NewsLedger};
pub use crate::news::sources::{NewsSource, SourceRegistry};
pub use crate::news::window::DeliveryWindow;
pub use crate::watchlist::WatchlistStore;
