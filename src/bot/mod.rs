// src/bot/mod.rs

pub mod api;
pub mod commands;
pub mod ratelimit;

use std::time::Duration;

use anyhow::Result;

use crate::bot::commands::CommandRouter;

const POLL_SECS: u64 = 50;

/// Long-poll loop: fetch updates, advance the offset, dispatch messages.
/// Poll failures back off briefly and the loop keeps going.
pub async fn run(mut router: CommandRouter) -> Result<()> {
    let telegram = router.telegram.clone();
    let mut offset = 0i64;
    loop {
        match telegram.get_updates(offset, POLL_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(msg) = &update.message {
                        router.handle_message(msg).await;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, "getUpdates failed, backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
