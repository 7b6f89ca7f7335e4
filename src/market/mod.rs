// src/market/mod.rs
// Price history, fundamentals, indicators, and the /analyze report.

pub mod data;
pub mod indicators;
pub mod report;
