// src/bot/ratelimit.rs

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Per-user, per-command cooldown. A passing check consumes the slot; a
/// refused call leaves the previous timestamp in place, so hammering a
/// command does not push the window further out.
#[derive(Debug)]
pub struct CommandRateLimiter {
    window: Duration,
    last: HashMap<(i64, String), DateTime<Utc>>,
}

impl CommandRateLimiter {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window: Duration::seconds(window_secs),
            last: HashMap::new(),
        }
    }

    pub fn check_and_update(&mut self, user_id: i64, command: &str, now: DateTime<Utc>) -> bool {
        let key = (user_id, command.to_string());
        if let Some(&last) = self.last.get(&key) {
            if now - last < self.window {
                return false;
            }
        }
        self.last.insert(key, now);
        true
    }
}
