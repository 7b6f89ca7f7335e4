//! One-shot delivery pass for cron-style setups and smoke checks.
//! Same wiring as the long-running scheduler, then exit.
//!
//! Run with:
//!   cargo run --bin autonews_once

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use idx_news_bot::bot::api::TelegramClient;
use idx_news_bot::config::Settings;
use idx_news_bot::news::autonews::{AutoNews, AutoNewsCfg, ChatSink};
use idx_news_bot::news::feed::GoogleNewsFeed;
use idx_news_bot::news::fetch::FetchCfg;
use idx_news_bot::news::ledger::LedgerStore;
use idx_news_bot::news::scrape::HttpArticleFetch;
use idx_news_bot::news::sources::SourceRegistry;
use idx_news_bot::news::summarize::GeminiSummarizer;
use idx_news_bot::news::window::DeliveryWindow;
use idx_news_bot::telemetry;
use idx_news_bot::watchlist::WatchlistStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let settings = Settings::from_env()?;
    telemetry::ensure_metrics_described();

    let telegram = Arc::new(TelegramClient::new(&settings.bot_token)?);
    let job = AutoNews {
        cfg: AutoNewsCfg {
            per_ticker_max_new: settings.per_ticker_max_new,
            per_chat_max_per_run: settings.per_chat_max_per_run,
            tickers_per_chat: settings.tickers_per_chat,
            pacing_ms: settings.pacing_ms,
            history_cap: settings.history_cap,
            fetch: FetchCfg {
                items_per_source: settings.items_per_source,
                limit_total: settings.limit_total,
            },
            window: settings
                .quiet_hours
                .as_deref()
                .and_then(DeliveryWindow::parse),
            allowed_group_ids: settings.allowed_group_ids.clone(),
        },
        registry: SourceRegistry::load(settings.sources_file.as_deref()),
        feed: Arc::new(GoogleNewsFeed::new()?),
        articles: Arc::new(HttpArticleFetch::new()?),
        summarizer: Arc::new(GeminiSummarizer::new(
            settings.gemini_api_key.clone(),
            settings.gemini_model.clone(),
        )?),
        sink: telegram as Arc<dyn ChatSink>,
        watchlists: WatchlistStore::new(&settings.watchlist_file),
        ledger: LedgerStore::new(&settings.news_state_file),
    };

    let stats = job.run_once(chrono::Local::now().time()).await;
    tracing::info!(
        sent = stats.sent,
        failed = stats.failed,
        skipped_window = stats.skipped_window,
        "single delivery pass done"
    );
    Ok(())
}
