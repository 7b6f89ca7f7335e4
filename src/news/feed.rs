// src/news/feed.rs
// Google News RSS search client. One query per (ticker, source) pair; the
// payload needs an HTML entity scrub before quick-xml will accept it.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

const SEARCH_URL: &str = "https://news.google.com/rss/search";

/// A feed entry that survived basic validation: both fields non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

/// Seam for the keyword news search. The production impl talks to Google
/// News; tests substitute canned results.
#[async_trait]
pub trait FeedSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<FeedItem>>;
}

pub struct GoogleNewsFeed {
    client: reqwest::Client,
}

impl GoogleNewsFeed {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("idx-news-bot/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building news feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSearch for GoogleNewsFeed {
    async fn search(&self, query: &str) -> Result<Vec<FeedItem>> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query), ("hl", "id"), ("gl", "ID"), ("ceid", "ID:id")])
            .send()
            .await
            .context("news search request")?;
        if !resp.status().is_success() {
            bail!("news search returned status {}", resp.status());
        }
        let body = resp.text().await.context("news search body")?;
        parse_feed(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
}

/// Parse an RSS search result, keeping only entries that carry both a
/// title and a link.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = quick_xml::de::from_str(&clean).context("parsing news rss")?;

    let mut items = Vec::with_capacity(rss.channel.item.len());
    for item in rss.channel.item {
        let title = item.title.map(|t| collapse_ws(&t)).unwrap_or_default();
        let link = item.link.map(|l| l.trim().to_string()).unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            continue;
        }
        items.push(FeedItem { title, link });
    }
    Ok(items)
}

// Google News embeds HTML entities that are not valid XML; swap them for
// plain characters before the parser sees them.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_titles_and_links() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>q - Google News</title>
              <item>
                <title>BBCA naik&nbsp;tipis</title>
                <link>https://www.cnbcindonesia.com/market/1</link>
                <pubDate>Tue, 12 Aug 2025 03:15:00 GMT</pubDate>
              </item>
              <item>
                <title>Tanpa tautan</title>
              </item>
              <item>
                <title></title>
                <link>https://www.cnbcindonesia.com/market/2</link>
              </item>
            </channel></rss>"#;

        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "BBCA naik tipis");
        assert_eq!(items[0].link, "https://www.cnbcindonesia.com/market/1");
    }

    #[test]
    fn empty_channel_is_a_valid_no_news_answer() {
        let xml = r#"<rss version="2.0"><channel><title>q</title></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed("<html>not rss</html>").is_err());
    }

    #[test]
    fn whitespace_in_titles_is_collapsed() {
        let xml = "<rss><channel><item><title>  a \n\t b </title><link>https://x/y</link></item></channel></rss>";
        let items = parse_feed(xml).unwrap();
        assert_eq!(items[0].title, "a b");
    }
}
