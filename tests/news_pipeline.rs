// tests/news_pipeline.rs
// Feed parsing against canned Google News payloads, and the candidate
// pipeline: path filter, per-source cap, registry-order merge, URL dedup,
// global cap, failing-source isolation.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use idx_news_bot::news::feed::{parse_feed, FeedItem, FeedSearch};
use idx_news_bot::{fetch_candidates, FetchCfg, NewsSource, SourceRegistry};

struct CannedFeed {
    by_query: HashMap<String, Vec<FeedItem>>,
}

impl CannedFeed {
    fn new(entries: &[(&str, Vec<FeedItem>)]) -> Self {
        Self {
            by_query: entries
                .iter()
                .map(|(q, items)| (q.to_string(), items.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl FeedSearch for CannedFeed {
    async fn search(&self, query: &str) -> Result<Vec<FeedItem>> {
        match self.by_query.get(query) {
            Some(items) => Ok(items.clone()),
            None => anyhow::bail!("no canned feed for {query}"),
        }
    }
}

fn item(title: &str, link: &str) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        link: link.to_string(),
    }
}

fn cfg(per_source: usize, total: usize) -> FetchCfg {
    FetchCfg {
        items_per_source: per_source,
        limit_total: total,
    }
}

#[test]
fn fixture_feed_parses_and_scrubs_entities() {
    let items = parse_feed(include_str!("fixtures/google_news_bbca.xml")).unwrap();
    // Two market items, one lifestyle item; the title-less and link-less
    // entries are dropped.
    assert_eq!(items.len(), 3);
    assert!(items[0].title.contains("Rp25 T"));
    assert!(items[1].title.contains("Dividen Interim BBCA &"));
    assert!(items[2].link.contains("/lifestyle/"));
}

#[test]
fn fixture_empty_feed_is_no_news() {
    let items = parse_feed(include_str!("fixtures/google_news_empty.xml")).unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn path_filter_keeps_content_pages_only() {
    let registry = SourceRegistry::from_sources(vec![NewsSource::new(
        "CNBC",
        "cnbcindonesia.com",
        &["/market", "/news", "/research"],
    )]);
    let fixture = parse_feed(include_str!("fixtures/google_news_bbca.xml")).unwrap();
    let feed = CannedFeed::new(&[("BBCA saham site:cnbcindonesia.com", fixture)]);

    let candidates = fetch_candidates(&feed, &registry, "BBCA", cfg(5, 10)).await;

    assert_eq!(candidates.len(), 2);
    assert!(candidates.iter().all(|c| c.url.contains("/market/")));
    assert!(candidates.iter().all(|c| c.source == "CNBC"));
}

#[tokio::test]
async fn per_source_cap_applies_after_filtering() {
    let registry = SourceRegistry::from_sources(vec![NewsSource::new(
        "CNBC",
        "cnbcindonesia.com",
        &["/market"],
    )]);
    let feed = CannedFeed::new(&[(
        "BBCA saham site:cnbcindonesia.com",
        vec![
            item("Lifestyle", "https://www.cnbcindonesia.com/lifestyle/1"),
            item("M1", "https://www.cnbcindonesia.com/market/1"),
            item("M2", "https://www.cnbcindonesia.com/market/2"),
            item("M3", "https://www.cnbcindonesia.com/market/3"),
        ],
    )]);

    let candidates = fetch_candidates(&feed, &registry, "BBCA", cfg(2, 10)).await;

    // The off-prefix item does not consume a slot.
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].title, "M1");
    assert_eq!(candidates[1].title, "M2");
}

#[tokio::test]
async fn merge_follows_registry_order_and_dedups_by_url() {
    let registry = SourceRegistry::from_sources(vec![
        NewsSource::new("IDX", "idx.co.id", &["/"]),
        NewsSource::new("Mirror", "idx.co.id", &["/"]),
        NewsSource::new("RTI", "rti.co.id", &["/"]),
    ]);
    let shared = "https://www.idx.co.id/berita/1";
    let feed = CannedFeed::new(&[
        ("BBCA saham site:idx.co.id", vec![item("Dari IDX", shared)]),
        ("BBCA saham site:rti.co.id", vec![item("Dari RTI", "https://rti.co.id/berita/2")]),
    ]);

    let candidates = fetch_candidates(&feed, &registry, "BBCA", cfg(2, 10)).await;

    // IDX and Mirror query the same domain; the duplicate URL keeps the
    // first-seen source label.
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].source, "IDX");
    assert_eq!(candidates[0].url, shared);
    assert_eq!(candidates[1].source, "RTI");
}

#[tokio::test]
async fn global_cap_truncates_after_merge() {
    let registry = SourceRegistry::from_sources(vec![
        NewsSource::new("A", "a.id", &["/"]),
        NewsSource::new("B", "b.id", &["/"]),
    ]);
    let feed = CannedFeed::new(&[
        (
            "BBCA saham site:a.id",
            vec![item("A1", "https://a.id/1"), item("A2", "https://a.id/2")],
        ),
        (
            "BBCA saham site:b.id",
            vec![item("B1", "https://b.id/1"), item("B2", "https://b.id/2")],
        ),
    ]);

    let candidates = fetch_candidates(&feed, &registry, "BBCA", cfg(2, 3)).await;

    assert_eq!(candidates.len(), 3);
    let titles: Vec<_> = candidates.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["A1", "A2", "B1"]);
}

#[tokio::test]
async fn failing_source_does_not_poison_the_rest() {
    let registry = SourceRegistry::from_sources(vec![
        NewsSource::new("Down", "down.id", &["/"]),
        NewsSource::new("Up", "up.id", &["/"]),
    ]);
    // No canned entry for down.id, so that search errors.
    let feed = CannedFeed::new(&[(
        "BBCA saham site:up.id",
        vec![item("U1", "https://up.id/1")],
    )]);

    let candidates = fetch_candidates(&feed, &registry, "BBCA", cfg(2, 6)).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].source, "Up");
}

#[tokio::test]
async fn lowercased_code_is_normalized_into_the_query() {
    let registry =
        SourceRegistry::from_sources(vec![NewsSource::new("RTI", "rti.co.id", &["/"])]);
    let feed = CannedFeed::new(&[(
        "BBCA saham site:rti.co.id",
        vec![item("R1", "https://rti.co.id/1")],
    )]);

    let candidates = fetch_candidates(&feed, &registry, "bbca", cfg(2, 6)).await;
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn no_news_everywhere_is_an_empty_result() {
    let registry =
        SourceRegistry::from_sources(vec![NewsSource::new("RTI", "rti.co.id", &["/"])]);
    let feed = CannedFeed::new(&[("ZZZZ saham site:rti.co.id", vec![])]);

    let candidates = fetch_candidates(&feed, &registry, "ZZZZ", cfg(2, 6)).await;
    assert!(candidates.is_empty());
}
