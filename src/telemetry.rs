// src/telemetry.rs

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;

/// One-time metric registration so every series carries help text on the
/// scrape endpoint. Safe to call from any path that records.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("autonews_runs_total", "Delivery passes started.");
        describe_counter!("autonews_sent_total", "News messages delivered to chats.");
        describe_counter!(
            "autonews_send_failures_total",
            "Deliveries that failed even after the plain-text retry."
        );
        describe_counter!(
            "news_fetch_errors_total",
            "Feed searches that errored, per source query."
        );
        describe_counter!(
            "news_candidates_total",
            "Candidates surviving filter, merge, dedup and cap."
        );
        describe_counter!(
            "summarize_failures_total",
            "Summarizer calls that produced no text."
        );
        describe_counter!("commands_total", "Bot commands handled, by command.");
        describe_gauge!(
            "autonews_last_run_ts",
            "Unix timestamp of the last completed delivery pass."
        );
    });
}

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_prometheus(addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("parsing METRICS_ADDR {addr:?}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("installing prometheus recorder")?;
    tracing::info!(%addr, "metrics endpoint up");
    Ok(())
}
