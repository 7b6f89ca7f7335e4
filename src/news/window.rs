// src/news/window.rs

use chrono::NaiveTime;

/// Same-day inclusive delivery window. There is no overnight wrap: an
/// inverted interval is rejected at parse time and delivery stays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl DeliveryWindow {
    /// Parse `"HH:MM-HH:MM"`. `None` means no gating; anything non-empty
    /// that does not parse is warned about and treated the same way, so a
    /// config typo can only ever fail open.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let Some((start_raw, end_raw)) = raw.split_once('-') else {
            tracing::warn!(window = raw, "unparseable delivery window, running unrestricted");
            return None;
        };
        let parse_hm = |s: &str| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok();
        match (parse_hm(start_raw), parse_hm(end_raw)) {
            (Some(start), Some(end)) if start <= end => Some(Self { start, end }),
            (Some(_), Some(_)) => {
                tracing::warn!(window = raw, "delivery window start is after end, running unrestricted");
                None
            }
            _ => {
                tracing::warn!(window = raw, "unparseable delivery window, running unrestricted");
                None
            }
        }
    }

    pub fn is_open_at(&self, now: NaiveTime) -> bool {
        self.start <= now && now <= self.end
    }
}
