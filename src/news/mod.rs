// src/news/mod.rs
// News pipeline: source registry -> feed search -> candidate assembly ->
// dedup ledger -> scheduled delivery, with scraping and summarization as
// optional enrichment along the way.

pub mod autonews;
pub mod feed;
pub mod fetch;
pub mod ledger;
pub mod scrape;
pub mod sources;
pub mod summarize;
pub mod window;
