// src/config.rs
// All runtime knobs in one place, read from the environment once at boot.
// Only the Telegram token is mandatory; everything else has a default.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub watchlist_file: PathBuf,
    pub news_state_file: PathBuf,
    pub allowed_group_ids: Vec<i64>,
    pub group_admin_only: bool,
    pub rate_limit_seconds: i64,
    pub hist_period: String,
    pub hist_interval: String,
    pub auto_news_enabled: bool,
    pub auto_news_interval_secs: u64,
    pub auto_news_initial_delay_secs: u64,
    pub per_ticker_max_new: usize,
    pub per_chat_max_per_run: usize,
    pub tickers_per_chat: usize,
    pub pacing_ms: u64,
    pub quiet_hours: Option<String>,
    pub items_per_source: usize,
    pub limit_total: usize,
    pub history_cap: usize,
    pub sources_file: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub metrics_addr: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let bot_token = env_trimmed("TELEGRAM_BOT_TOKEN")
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN is not set"))?;

        Ok(Self {
            bot_token,
            watchlist_file: PathBuf::from(env_or("WATCHLIST_FILE", "watchlists.json")),
            news_state_file: PathBuf::from(env_or("NEWS_STATE_FILE", "news_state.json")),
            allowed_group_ids: parse_id_list(&env_or("ALLOWED_GROUP_IDS", "")),
            group_admin_only: env_flag("GROUP_ADMIN_ONLY", true),
            rate_limit_seconds: env_parse("RATE_LIMIT_SECONDS", 15),
            hist_period: env_or("HIST_PERIOD", "9mo"),
            hist_interval: env_or("HIST_INTERVAL", "1d"),
            auto_news_enabled: env_flag("AUTO_NEWS_ENABLED", true),
            auto_news_interval_secs: env_parse("AUTO_NEWS_INTERVAL_SECONDS", 900),
            auto_news_initial_delay_secs: env_parse("AUTO_NEWS_INITIAL_DELAY_SECONDS", 60),
            per_ticker_max_new: env_parse("AUTO_NEWS_PER_TICKER_MAX_NEW", 1),
            per_chat_max_per_run: env_parse("AUTO_NEWS_PER_CHAT_MAX_PER_RUN", 5),
            tickers_per_chat: env_parse("AUTO_NEWS_TICKERS_PER_CHAT", 25),
            pacing_ms: env_parse("AUTO_NEWS_PACING_MS", 1000),
            quiet_hours: env_trimmed("QUIET_HOURS_WIB"),
            items_per_source: env_parse("NEWS_ITEMS_PER_SOURCE", 2),
            limit_total: env_parse("NEWS_LIMIT_TOTAL", 6),
            history_cap: env_parse("NEWS_HISTORY_CAP", 40),
            sources_file: env_trimmed("NEWS_SOURCES_FILE").map(PathBuf::from),
            gemini_api_key: env_trimmed("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            metrics_addr: env_trimmed("METRICS_ADDR"),
        })
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_trimmed(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_trimmed(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Truthy set mirrors what ops already put in unit files: 1/true/yes/y.
/// Any other non-empty value is an explicit "off".
fn env_flag(key: &str, default: bool) -> bool {
    match env_trimmed(key).map(|v| v.to_ascii_lowercase()) {
        Some(v) => matches!(v.as_str(), "1" | "true" | "yes" | "y"),
        None => default,
    }
}

/// Comma-separated chat ids; entries that do not parse are skipped with a
/// warning rather than refusing to boot.
fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            match part.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(value = part, "ignoring unparseable id in ALLOWED_GROUP_IDS");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn id_list_skips_garbage() {
        assert_eq!(parse_id_list("-1001234, abc, 42,,"), vec![-1001234, 42]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    #[serial]
    fn flag_parses_truthy_and_explicit_off() {
        env::set_var("FLAG_PROBE", "YES");
        assert!(env_flag("FLAG_PROBE", false));
        env::set_var("FLAG_PROBE", "off");
        assert!(!env_flag("FLAG_PROBE", true));
        env::remove_var("FLAG_PROBE");
        assert!(env_flag("FLAG_PROBE", true));
    }

    #[test]
    #[serial]
    fn from_env_requires_token() {
        env::remove_var("TELEGRAM_BOT_TOKEN");
        assert!(Settings::from_env().is_err());
    }

    #[test]
    #[serial]
    fn from_env_applies_defaults_and_overrides() {
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("AUTO_NEWS_INTERVAL_SECONDS", "300");
        env::set_var("GROUP_ADMIN_ONLY", "no");
        env::remove_var("QUIET_HOURS_WIB");

        let s = Settings::from_env().unwrap();
        assert_eq!(s.bot_token, "123:abc");
        assert_eq!(s.auto_news_interval_secs, 300);
        assert!(!s.group_admin_only);
        assert_eq!(s.per_chat_max_per_run, 5);
        assert_eq!(s.gemini_model, "gemini-2.5-flash");
        assert!(s.quiet_hours.is_none());

        env::remove_var("TELEGRAM_BOT_TOKEN");
        env::remove_var("AUTO_NEWS_INTERVAL_SECONDS");
        env::remove_var("GROUP_ADMIN_ONLY");
    }
}
