// src/news/summarize.rs

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};

/// Seam for the news summarizer. `None` means "no summary"; delivery then
/// falls back to headline-only, so errors stay inside the impl.
#[async_trait]
pub trait Summarize: Send + Sync {
    async fn summarize(
        &self,
        title: &str,
        source: &str,
        ticker: &str,
        url: &str,
        text: &str,
    ) -> Option<String>;
}

/// Always-skip summarizer for runs without a configured provider.
pub struct DisabledSummarizer;

#[async_trait]
impl Summarize for DisabledSummarizer {
    async fn summarize(&self, _: &str, _: &str, _: &str, _: &str, _: &str) -> Option<String> {
        None
    }
}

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini `generateContent` client. A missing API key is a supported
/// configuration, not an error: every call just answers `None`.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("idx-news-bot/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building summarizer http client")?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    // Paraphrase-only, impact-focused, with a fixed "not relevant" answer
    // so downstream text never quotes the article wholesale.
    fn prompt(title: &str, source: &str, ticker: &str, url: &str, text: &str) -> String {
        format!(
            r#"Anda adalah analis pasar modal Indonesia.

Tugas Anda:
1. Kumpulkan berita terbaru hari ini terkait seluruh saham yang terdaftar di Bursa Efek Indonesia (BEI).
2. Fokus pada berita yang berdampak terhadap harga saham, kinerja perusahaan, atau sentimen pasar.
3. Identifikasi dan soroti corporate action jika ada, seperti:
   - Dividen
   - Stock split / reverse split
   - Right issue
   - Buyback saham
   - Akuisisi / merger
   - IPO anak usaha
   - Backdoor
   - Perubahan direksi atau komisaris
4. Abaikan berita yang tidak relevan atau bersifat opini tanpa data.

Aturan:
- Jangan menyalin teks artikel panjang; parafrase saja.
- Fokus pada dampak ke emiten {ticker} (positif/negatif/netral) + alasan.
- Sertakan "Apa yang perlu dipantau" (1-3 poin).
- Jika isi artikel tidak relevan dengan {ticker}, jawab: "Tidak cukup relevan."

Metadata:
- Judul: {title}
- Sumber: {source}
- URL: {url}

Teks artikel (untuk dipahami, bukan untuk disalin):
{text}"#
        )
    }
}

#[async_trait]
impl Summarize for GeminiSummarizer {
    async fn summarize(
        &self,
        title: &str,
        source: &str,
        ticker: &str,
        url: &str,
        text: &str,
    ) -> Option<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("summarizer disabled, no GEMINI_API_KEY");
            return None;
        };

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct Request<'a> {
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            candidates: Vec<ResponseCandidate>,
        }
        #[derive(Deserialize)]
        struct ResponseCandidate {
            content: Option<ResponseContent>,
        }
        #[derive(Deserialize)]
        struct ResponseContent {
            #[serde(default)]
            parts: Vec<ResponsePart>,
        }
        #[derive(Deserialize)]
        struct ResponsePart {
            text: Option<String>,
        }

        let prompt = Self::prompt(title, source, ticker, url, text);
        let request = Request {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let endpoint = format!("{GEMINI_BASE}/{}:generateContent", self.model);
        let resp = match self
            .client
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = ?e, "summarize request failed");
                counter!("summarize_failures_total").increment(1);
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "summarize returned non-success");
            counter!("summarize_failures_total").increment(1);
            return None;
        }
        let body: Response = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = ?e, "summarize response unreadable");
                counter!("summarize_failures_total").increment(1);
                return None;
            }
        };

        let summary = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if summary.is_none() {
            counter!("summarize_failures_total").increment(1);
        }
        summary
    }
}
