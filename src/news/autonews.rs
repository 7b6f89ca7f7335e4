// src/news/autonews.rs
// The auto-news scheduler. One strictly sequential pass over every
// subscribed chat: the ledger is loaded once per pass, mutated in memory,
// and saved once at the end.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveTime;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::news::feed::FeedSearch;
use crate::news::fetch::{fetch_candidates, Candidate, FetchCfg};
use crate::news::ledger::LedgerStore;
use crate::news::scrape::ArticleFetch;
use crate::news::sources::SourceRegistry;
use crate::news::summarize::Summarize;
use crate::news::window::DeliveryWindow;
use crate::watchlist::{code_only, WatchlistStore};

/// Outbound message channel. The production impl is the Telegram client;
/// tests substitute a recording sink.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()>;

    /// Markdown first; on rejection retry once with formatting stripped.
    async fn send_with_fallback(&self, chat_id: i64, text: &str) -> Result<()> {
        match self.send(chat_id, text, true).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::debug!(error = ?e, chat = chat_id, "markdown send rejected, retrying plain");
                self.send(chat_id, &strip_markdown(text), false).await
            }
        }
    }
}

/// Telegram-flavored markdown only uses `*` and `_` here; dropping both
/// yields the plain-text rendition.
pub fn strip_markdown(text: &str) -> String {
    text.replace(['*', '_'], "")
}

#[derive(Debug, Clone)]
pub struct AutoNewsCfg {
    pub per_ticker_max_new: usize,
    pub per_chat_max_per_run: usize,
    pub tickers_per_chat: usize,
    pub pacing_ms: u64,
    pub history_cap: usize,
    pub fetch: FetchCfg,
    pub window: Option<DeliveryWindow>,
    /// Empty means every subscribed chat is eligible.
    pub allowed_group_ids: Vec<i64>,
}

impl Default for AutoNewsCfg {
    fn default() -> Self {
        Self {
            per_ticker_max_new: 1,
            per_chat_max_per_run: 5,
            tickers_per_chat: 25,
            pacing_ms: 1000,
            history_cap: 40,
            fetch: FetchCfg::default(),
            window: None,
            allowed_group_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sent: usize,
    pub failed: usize,
    pub skipped_window: bool,
}

pub struct AutoNews {
    pub cfg: AutoNewsCfg,
    pub registry: SourceRegistry,
    pub feed: Arc<dyn FeedSearch>,
    pub articles: Arc<dyn ArticleFetch>,
    pub summarizer: Arc<dyn Summarize>,
    pub sink: Arc<dyn ChatSink>,
    pub watchlists: WatchlistStore,
    pub ledger: LedgerStore,
}

impl AutoNews {
    /// One full delivery pass. `now` is the time-of-day for the window
    /// gate; the caller owns the clock so tests can pin it.
    pub async fn run_once(&self, now: NaiveTime) -> RunStats {
        crate::telemetry::ensure_metrics_described();
        counter!("autonews_runs_total").increment(1);

        let mut stats = RunStats::default();

        if let Some(window) = &self.cfg.window {
            if !window.is_open_at(now) {
                tracing::debug!("outside delivery window, skipping pass");
                stats.skipped_window = true;
                return stats;
            }
        }

        let subscriptions = self.watchlists.get_all();
        if subscriptions.is_empty() {
            return stats;
        }

        let mut ledger = self.ledger.load();
        let mut dirty = false;

        for (chat_id, tickers) in &subscriptions {
            let chat_id = *chat_id;
            if !self.cfg.allowed_group_ids.is_empty()
                && !self.cfg.allowed_group_ids.contains(&chat_id)
            {
                continue;
            }
            if !ledger.autonews_enabled(chat_id) {
                continue;
            }

            let mut sent_this_chat = 0usize;

            for ticker in tickers.iter().take(self.cfg.tickers_per_chat) {
                let code = code_only(ticker);
                let candidates =
                    fetch_candidates(self.feed.as_ref(), &self.registry, &code, self.cfg.fetch)
                        .await;

                let mut new_for_ticker = 0usize;
                for candidate in candidates {
                    // Already-seen URLs cost nothing against the caps.
                    if ledger.is_delivered(chat_id, &code, &candidate.url) {
                        continue;
                    }

                    let message = self.build_message(&code, &candidate).await;
                    match self.sink.send_with_fallback(chat_id, &message).await {
                        Ok(()) => {
                            stats.sent += 1;
                            counter!("autonews_sent_total").increment(1);
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = ?e,
                                chat = chat_id,
                                code = %code,
                                url = %candidate.url,
                                "delivery failed, marking seen anyway"
                            );
                            counter!("autonews_send_failures_total").increment(1);
                            stats.failed += 1;
                        }
                    }

                    // Seen-state must not regress: record even on failure.
                    ledger.record(chat_id, &code, &candidate.url, self.cfg.history_cap);
                    dirty = true;
                    new_for_ticker += 1;
                    sent_this_chat += 1;

                    tokio::time::sleep(Duration::from_millis(self.cfg.pacing_ms)).await;

                    if new_for_ticker >= self.cfg.per_ticker_max_new {
                        break;
                    }
                    if sent_this_chat >= self.cfg.per_chat_max_per_run {
                        break;
                    }
                }

                if sent_this_chat >= self.cfg.per_chat_max_per_run {
                    break;
                }
            }
        }

        if dirty {
            if let Err(e) = self.ledger.save(&ledger) {
                tracing::warn!(error = ?e, "saving news ledger failed");
            }
        }
        gauge!("autonews_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        stats
    }

    async fn build_message(&self, code: &str, candidate: &Candidate) -> String {
        let article = self.articles.scrape(&candidate.url).await;
        let summary = match &article {
            Some(article) => {
                let title = if article.title.is_empty() {
                    &candidate.title
                } else {
                    &article.title
                };
                self.summarizer
                    .summarize(title, &candidate.source, code, &candidate.url, &article.text)
                    .await
            }
            None => None,
        };
        compose_message(code, candidate, summary.as_deref())
    }
}

/// Rich update when a summary exists, headline-only otherwise.
pub fn compose_message(code: &str, candidate: &Candidate, summary: Option<&str>) -> String {
    match summary {
        Some(summary) => format!(
            "\u{1F4F0} *News update {code}*\n**Sumber:** {}\n**Judul:** {}\n\n{summary}\n\n\u{1F517} {}\n_Ringkasan AI (parafrase), baca sumber untuk detail._",
            candidate.source, candidate.title, candidate.url
        ),
        None => format!(
            "\u{1F4F0} *News update {code}*\n**Sumber:** {}\n**Judul:** {}\n\u{1F517} {}",
            candidate.source, candidate.title, candidate.url
        ),
    }
}

/// Initial delay, then a fixed repeating period; each tick runs one pass
/// against the current wall clock.
pub fn spawn_auto_news(
    job: Arc<AutoNews>,
    interval_secs: u64,
    initial_delay_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(initial_delay_secs)).await;
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let now = chrono::Local::now().time();
            let stats = job.run_once(now).await;
            if stats.skipped_window {
                continue;
            }
            tracing::info!(sent = stats.sent, failed = stats.failed, "auto news pass done");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            source: "CNBC".into(),
            title: "BBCA cetak laba".into(),
            url: "https://www.cnbcindonesia.com/market/1".into(),
        }
    }

    #[test]
    fn message_with_summary_carries_disclaimer() {
        let text = compose_message("BBCA", &candidate(), Some("Ringkas."));
        assert!(text.contains("*News update BBCA*"));
        assert!(text.contains("**Sumber:** CNBC"));
        assert!(text.contains("**Judul:** BBCA cetak laba"));
        assert!(text.contains("Ringkas."));
        assert!(text.contains("Ringkasan AI (parafrase)"));
        assert!(text.contains("https://www.cnbcindonesia.com/market/1"));
    }

    #[test]
    fn headline_only_message_has_no_disclaimer() {
        let text = compose_message("BBCA", &candidate(), None);
        assert!(text.contains("*News update BBCA*"));
        assert!(!text.contains("Ringkasan AI"));
        assert!(text.contains("https://www.cnbcindonesia.com/market/1"));
    }

    #[test]
    fn markdown_strip_removes_stars_and_underscores() {
        assert_eq!(strip_markdown("*a* _b_ c"), "a b c");
        assert_eq!(strip_markdown("plain"), "plain");
    }
}
