// src/news/scrape.rs
// Best-effort article body extraction. Publishers change markup at will,
// so anything below the minimum usable length degrades to headline-only
// delivery instead of erroring.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;

/// Below this much paragraph text the page is treated as unusable
/// (cookie walls, JS shells, teaser stubs).
pub const MIN_TEXT_CHARS: usize = 300;
/// Cap on the text handed to the summarizer.
pub const MAX_TEXT_CHARS: usize = 12_000;

const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub text: String,
}

/// Seam for article retrieval. `None` means "no usable body"; the caller
/// falls back to the headline, so there is no error to surface.
#[async_trait]
pub trait ArticleFetch: Send + Sync {
    async fn scrape(&self, url: &str) -> Option<Article>;
}

pub struct HttpArticleFetch {
    client: reqwest::Client,
}

impl HttpArticleFetch {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_UA)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building article http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleFetch for HttpArticleFetch {
    async fn scrape(&self, url: &str) -> Option<Article> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(error = ?e, url, "article fetch failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), url, "article fetch non-success");
            return None;
        }
        let html = resp.text().await.ok()?;
        extract_article(&html)
    }
}

/// Pull a usable `(title, text)` pair out of raw HTML. Title comes from
/// `<title>`, falling back to the first `<h1>`; the body is every `<p>`
/// joined with newlines.
pub fn extract_article(html: &str) -> Option<Article> {
    let stripped = strip_blocks(html);

    let title = first_capture(&stripped, re_title())
        .or_else(|| first_capture(&stripped, re_h1()))
        .map(|t| clean_fragment(&t))
        .unwrap_or_default();

    let mut paragraphs: Vec<String> = Vec::new();
    for cap in re_paragraph().captures_iter(&stripped) {
        if let Some(m) = cap.get(1) {
            let text = clean_fragment(m.as_str());
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }
    let text = paragraphs.join("\n");

    if text.chars().count() < MIN_TEXT_CHARS {
        return None;
    }
    let text = text.chars().take(MAX_TEXT_CHARS).collect();
    Some(Article { title, text })
}

fn strip_blocks(html: &str) -> String {
    static RE_SCRIPT: OnceCell<Regex> = OnceCell::new();
    static RE_STYLE: OnceCell<Regex> = OnceCell::new();
    let re_script =
        RE_SCRIPT.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
    let re_style = RE_STYLE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());

    let without_scripts = re_script.replace_all(html, " ");
    re_style.replace_all(&without_scripts, " ").to_string()
}

fn re_title() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap())
}

fn re_h1() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap())
}

fn re_paragraph() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap())
}

fn first_capture(haystack: &str, re: &Regex) -> Option<String> {
    re.captures(haystack)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

// Tag strip, entity decode, whitespace collapse for one captured chunk.
fn clean_fragment(fragment: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let without_tags = re_tags.replace_all(fragment, " ");
    let decoded = html_escape::decode_html_entities(&without_tags).to_string();
    re_ws.replace_all(&decoded, " ").trim().to_string()
}
