//! IDX news bot binary entrypoint.
//! Boots the auto-news scheduler and the Telegram long-poll loop.
//!
//! See `README.md` for commands and configuration.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use idx_news_bot::bot;
use idx_news_bot::bot::api::TelegramClient;
use idx_news_bot::bot::commands::CommandRouter;
use idx_news_bot::bot::ratelimit::CommandRateLimiter;
use idx_news_bot::config::Settings;
use idx_news_bot::market::data::MarketDataClient;
use idx_news_bot::news::autonews::{spawn_auto_news, AutoNews, AutoNewsCfg, ChatSink};
use idx_news_bot::news::feed::{FeedSearch, GoogleNewsFeed};
use idx_news_bot::news::fetch::FetchCfg;
use idx_news_bot::news::ledger::LedgerStore;
use idx_news_bot::news::scrape::HttpArticleFetch;
use idx_news_bot::news::sources::SourceRegistry;
use idx_news_bot::news::summarize::GeminiSummarizer;
use idx_news_bot::news::window::DeliveryWindow;
use idx_news_bot::telemetry;
use idx_news_bot::watchlist::WatchlistStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the vars come from the unit file.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env()?;
    telemetry::ensure_metrics_described();
    if let Some(addr) = settings.metrics_addr.as_deref() {
        telemetry::init_prometheus(addr)?;
    }

    let telegram = Arc::new(TelegramClient::new(&settings.bot_token)?);
    let registry = SourceRegistry::load(settings.sources_file.as_deref());
    let feed: Arc<dyn FeedSearch> = Arc::new(GoogleNewsFeed::new()?);
    let fetch_cfg = FetchCfg {
        items_per_source: settings.items_per_source,
        limit_total: settings.limit_total,
    };

    if settings.auto_news_enabled {
        let job = Arc::new(AutoNews {
            cfg: AutoNewsCfg {
                per_ticker_max_new: settings.per_ticker_max_new,
                per_chat_max_per_run: settings.per_chat_max_per_run,
                tickers_per_chat: settings.tickers_per_chat,
                pacing_ms: settings.pacing_ms,
                history_cap: settings.history_cap,
                fetch: fetch_cfg,
                window: settings
                    .quiet_hours
                    .as_deref()
                    .and_then(DeliveryWindow::parse),
                allowed_group_ids: settings.allowed_group_ids.clone(),
            },
            registry: registry.clone(),
            feed: feed.clone(),
            articles: Arc::new(HttpArticleFetch::new()?),
            summarizer: Arc::new(GeminiSummarizer::new(
                settings.gemini_api_key.clone(),
                settings.gemini_model.clone(),
            )?),
            sink: telegram.clone() as Arc<dyn ChatSink>,
            watchlists: WatchlistStore::new(&settings.watchlist_file),
            ledger: LedgerStore::new(&settings.news_state_file),
        });
        spawn_auto_news(
            job,
            settings.auto_news_interval_secs,
            settings.auto_news_initial_delay_secs,
        );
        tracing::info!(
            interval_secs = settings.auto_news_interval_secs,
            "auto news scheduler started"
        );
    } else {
        tracing::info!("auto news disabled");
    }

    let router = CommandRouter {
        telegram: telegram.clone(),
        watchlists: WatchlistStore::new(&settings.watchlist_file),
        ledger: LedgerStore::new(&settings.news_state_file),
        market: MarketDataClient::new(&settings.hist_period, &settings.hist_interval)?,
        feed,
        registry,
        fetch_cfg,
        limiter: CommandRateLimiter::new(settings.rate_limit_seconds),
        allowed_group_ids: settings.allowed_group_ids.clone(),
        group_admin_only: settings.group_admin_only,
    };

    tracing::info!("bot running");
    bot::run(router).await
}
