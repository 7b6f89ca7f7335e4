// src/news/fetch.rs
// Candidate assembly: query every registered source for a ticker, filter
// by the registry's domain and path rules, merge in registry order, dedup
// by URL keeping the first occurrence, cap the total.

use std::collections::HashSet;

use metrics::counter;

use crate::news::feed::FeedSearch;
use crate::news::sources::SourceRegistry;

/// A news item surfaced for a ticker, not yet checked against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchCfg {
    pub items_per_source: usize,
    pub limit_total: usize,
}

impl Default for FetchCfg {
    fn default() -> Self {
        Self {
            items_per_source: 2,
            limit_total: 6,
        }
    }
}

/// One failing source never poisons the rest; an empty result is a valid
/// "no news right now" answer, not an error.
pub async fn fetch_candidates(
    feed: &dyn FeedSearch,
    registry: &SourceRegistry,
    code: &str,
    cfg: FetchCfg,
) -> Vec<Candidate> {
    let code = code.trim().to_uppercase();
    let mut merged: Vec<Candidate> = Vec::new();

    for source in registry.iter() {
        let query = format!("{code} saham site:{}", source.domain);
        let items = match feed.search(&query).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = ?e, source = %source.label, code = %code, "news search failed");
                counter!("news_fetch_errors_total").increment(1);
                continue;
            }
        };

        let mut kept = 0usize;
        for item in items {
            if kept >= cfg.items_per_source {
                break;
            }
            if !source.url_matches(&item.link) {
                continue;
            }
            merged.push(Candidate {
                source: source.label.clone(),
                title: item.title,
                url: item.link,
            });
            kept += 1;
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<Candidate> = Vec::with_capacity(merged.len());
    for candidate in merged {
        if seen.insert(candidate.url.clone()) {
            unique.push(candidate);
        }
    }
    unique.truncate(cfg.limit_total);

    counter!("news_candidates_total").increment(unique.len() as u64);
    unique
}
