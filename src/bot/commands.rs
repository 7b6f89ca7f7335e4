// src/bot/commands.rs
// Command parsing and dispatch. Guard order per command: group allow-list,
// per-user rate limit, then the group admin check. Guard refusals are
// silent; user-facing failures get one apologetic reply.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use metrics::counter;

use crate::bot::api::{Message, TelegramClient};
use crate::bot::ratelimit::CommandRateLimiter;
use crate::market::data::MarketDataClient;
use crate::market::report;
use crate::news::fetch::{fetch_candidates, Candidate, FetchCfg};
use crate::news::feed::FeedSearch;
use crate::news::ledger::LedgerStore;
use crate::news::sources::SourceRegistry;
use crate::watchlist::{code_only, normalize_idx_ticker, WatchlistStore};

const USAGE: &str = "Perintah:\n\
- /analyze BBCA\n\
- /news BBCA\n\
- /watch add BBCA | /watch remove BBCA | /watch list\n\
- /autonews on | /autonews off (admin)\n\
\n\
Catatan: auto-news jalan untuk saham yang ada di watchlist group.";

/// `/watch@SomeBot add BBCA` -> `("watch", ["add", "BBCA"])`.
pub fn parse_command(text: &str) -> Option<(String, Vec<String>)> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    if name.is_empty() {
        return None;
    }
    Some((
        name.to_ascii_lowercase(),
        parts.map(|s| s.to_string()).collect(),
    ))
}

/// `/news` listing: one line per candidate plus an indented link.
pub fn format_news_list(code: &str, items: &[Candidate]) -> String {
    let mut lines = vec![format!("*Berita {code}*")];
    for item in items {
        lines.push(format!("- [{}] {}\n  {}", item.source, item.title, item.url));
    }
    lines.join("\n")
}

pub struct CommandRouter {
    pub telegram: Arc<TelegramClient>,
    pub watchlists: WatchlistStore,
    pub ledger: LedgerStore,
    pub market: MarketDataClient,
    pub feed: Arc<dyn FeedSearch>,
    pub registry: SourceRegistry,
    pub fetch_cfg: FetchCfg,
    pub limiter: CommandRateLimiter,
    pub allowed_group_ids: Vec<i64>,
    pub group_admin_only: bool,
}

impl CommandRouter {
    pub async fn handle_message(&mut self, msg: &Message) {
        let Some(text) = msg.text.as_deref() else {
            return;
        };
        let Some((command, args)) = parse_command(text) else {
            return;
        };
        if !matches!(
            command.as_str(),
            "start" | "analyze" | "news" | "watch" | "autonews"
        ) {
            return;
        }

        if !self.guard(msg, &command).await {
            return;
        }
        counter!("commands_total", "command" => command.clone()).increment(1);

        let chat_id = msg.chat.id;
        let outcome = match command.as_str() {
            "start" => self.cmd_start(chat_id).await,
            "analyze" => self.cmd_analyze(chat_id, &args).await,
            "news" => self.cmd_news(chat_id, &args).await,
            "watch" => self.cmd_watch(chat_id, &args).await,
            "autonews" => self.cmd_autonews(chat_id, &args).await,
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            tracing::warn!(error = ?e, chat = chat_id, command = %command, "command failed");
        }
    }

    /// Silent refusal keeps unauthorized chats from probing the bot.
    async fn guard(&mut self, msg: &Message, command: &str) -> bool {
        let chat = &msg.chat;
        if chat.is_group()
            && !self.allowed_group_ids.is_empty()
            && !self.allowed_group_ids.contains(&chat.id)
        {
            return false;
        }

        // Updates without a sender (channel posts) skip the limiter.
        if let Some(user) = &msg.from {
            if !self.limiter.check_and_update(user.id, command, Utc::now()) {
                return false;
            }
        }

        if chat.is_group() && self.group_admin_only {
            let Some(user) = &msg.from else {
                return false;
            };
            if !self.telegram.is_chat_admin(chat.id, user.id).await {
                return false;
            }
        }

        true
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<()> {
        self.telegram.send_message(chat_id, text, false).await
    }

    async fn reply_markdown(&self, chat_id: i64, text: &str) -> Result<()> {
        self.telegram.send_message(chat_id, text, true).await
    }

    async fn cmd_start(&self, chat_id: i64) -> Result<()> {
        self.reply(chat_id, USAGE).await
    }

    async fn cmd_analyze(&self, chat_id: i64, args: &[String]) -> Result<()> {
        let Some(raw) = args.first() else {
            return self.reply(chat_id, "Format: /analyze BBCA").await;
        };
        let ticker = normalize_idx_ticker(raw);

        match self.analyze(&ticker).await {
            Ok(Some(text)) => {
                if let Err(e) = self.reply_markdown(chat_id, &text).await {
                    tracing::warn!(error = ?e, ticker = %ticker, "analyze reply failed");
                    return self
                        .reply(chat_id, "Gagal ambil data (sementara). Coba lagi.")
                        .await;
                }
                Ok(())
            }
            Ok(None) => {
                self.reply(chat_id, &format!("Tidak ada data harga untuk {ticker}."))
                    .await
            }
            Err(e) => {
                tracing::warn!(error = ?e, ticker = %ticker, "analyze failed");
                self.reply(chat_id, "Gagal ambil data (sementara). Coba lagi.")
                    .await
            }
        }
    }

    async fn analyze(&self, ticker: &str) -> Result<Option<String>> {
        let history = self.market.price_history(ticker).await?;
        if history.closes.is_empty() {
            return Ok(None);
        }
        let fundamentals = self.market.fundamentals(ticker).await?;
        Ok(Some(report::compose_report(ticker, &history, &fundamentals)))
    }

    async fn cmd_news(&self, chat_id: i64, args: &[String]) -> Result<()> {
        let Some(raw) = args.first() else {
            return self.reply(chat_id, "Format: /news BBCA").await;
        };
        let code = code_only(raw);

        let items =
            fetch_candidates(self.feed.as_ref(), &self.registry, &code, self.fetch_cfg).await;
        if items.is_empty() {
            return self
                .reply(
                    chat_id,
                    &format!("Belum ketemu berita untuk {code} dari sumber yang ditentukan."),
                )
                .await;
        }

        let text = format_news_list(&code, &items);
        if let Err(e) = self.reply_markdown(chat_id, &text).await {
            tracing::warn!(error = ?e, code = %code, "news reply failed");
            return self
                .reply(chat_id, "Gagal ambil berita (sementara). Coba lagi.")
                .await;
        }
        Ok(())
    }

    async fn cmd_watch(&self, chat_id: i64, args: &[String]) -> Result<()> {
        let Some(action) = args.first().map(|a| a.to_ascii_lowercase()) else {
            return self
                .reply(
                    chat_id,
                    "Format: /watch add BBCA | /watch remove BBCA | /watch list",
                )
                .await;
        };

        if action == "list" {
            let list = self.watchlists.get(chat_id);
            let text = if list.is_empty() {
                "Watchlist kosong.".to_string()
            } else {
                format!("Watchlist:\n{}", list.join("\n"))
            };
            return self.reply(chat_id, &text).await;
        }

        let Some(raw) = args.get(1) else {
            return self
                .reply(chat_id, "Format: /watch add BBCA | /watch remove BBCA")
                .await;
        };
        let ticker = normalize_idx_ticker(raw);

        match action.as_str() {
            "add" => {
                let mut list = self.watchlists.get(chat_id);
                list.push(ticker.clone());
                list.sort();
                list.dedup();
                self.watchlists.set(chat_id, list)?;
                self.reply(chat_id, &format!("Ditambahkan: {ticker}")).await
            }
            "remove" => {
                let mut list = self.watchlists.get(chat_id);
                list.retain(|t| t != &ticker);
                self.watchlists.set(chat_id, list)?;
                self.reply(chat_id, &format!("Dihapus: {ticker}")).await
            }
            _ => {
                self.reply(chat_id, "Aksi tidak dikenal. Pakai: add/remove/list")
                    .await
            }
        }
    }

    async fn cmd_autonews(&self, chat_id: i64, args: &[String]) -> Result<()> {
        match args.first().map(|a| a.to_ascii_lowercase()).as_deref() {
            Some("on") => {
                self.set_autonews(chat_id, true)?;
                self.reply(chat_id, "Auto-news: ON (chat ini)").await
            }
            Some("off") => {
                self.set_autonews(chat_id, false)?;
                self.reply(chat_id, "Auto-news: OFF (chat ini)").await
            }
            _ => {
                self.reply(chat_id, "Format: /autonews on | /autonews off")
                    .await
            }
        }
    }

    fn set_autonews(&self, chat_id: i64, enabled: bool) -> Result<()> {
        let mut ledger = self.ledger.load();
        ledger.set_autonews(chat_id, enabled);
        self.ledger.save(&ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing_strips_bot_mention() {
        assert_eq!(
            parse_command("/watch@IdxNewsBot add BBCA"),
            Some(("watch".into(), vec!["add".into(), "BBCA".into()]))
        );
        assert_eq!(parse_command("/START"), Some(("start".into(), vec![])));
        assert_eq!(parse_command("  /news   bbca  "), Some(("news".into(), vec!["bbca".into()])));
    }

    #[test]
    fn non_commands_are_ignored() {
        assert!(parse_command("halo semua").is_none());
        assert!(parse_command("").is_none());
        assert!(parse_command("/").is_none());
        assert!(parse_command("/@bot").is_none());
    }

    #[test]
    fn news_list_formatting() {
        let items = vec![
            Candidate {
                source: "CNBC".into(),
                title: "BBCA cetak laba".into(),
                url: "https://a/market/1".into(),
            },
            Candidate {
                source: "RTI".into(),
                title: "Dividen interim".into(),
                url: "https://b/2".into(),
            },
        ];
        let text = format_news_list("BBCA", &items);
        assert!(text.starts_with("*Berita BBCA*\n"));
        assert!(text.contains("- [CNBC] BBCA cetak laba\n  https://a/market/1"));
        assert!(text.contains("- [RTI] Dividen interim\n  https://b/2"));
    }

    #[test]
    fn usage_lists_every_command() {
        for needle in ["/analyze", "/news", "/watch", "/autonews"] {
            assert!(USAGE.contains(needle));
        }
    }
}
