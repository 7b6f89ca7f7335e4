// src/market/data.rs
// Yahoo Finance v8 chart + v10 quoteSummary, the two calls behind
// /analyze. Field-level nulls are everywhere in these payloads, so every
// number comes back Optional.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData";

const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Daily closes oldest first, plus the date of the last bar that actually
/// carried a close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    pub closes: Vec<f64>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fundamentals {
    pub sector: Option<String>,
    pub market_cap: Option<f64>,
    pub per: Option<f64>,
    pub pbv: Option<f64>,
    pub roe: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
}

pub struct MarketDataClient {
    client: reqwest::Client,
    period: String,
    interval: String,
}

impl MarketDataClient {
    pub fn new(period: &str, interval: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_UA)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building market data http client")?;
        Ok(Self {
            client,
            period: period.to_string(),
            interval: interval.to_string(),
        })
    }

    pub async fn price_history(&self, ticker: &str) -> Result<PriceHistory> {
        let url = format!("{CHART_BASE}/{ticker}");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("range", self.period.as_str()),
                ("interval", self.interval.as_str()),
            ])
            .send()
            .await
            .context("price history request")?;
        if !resp.status().is_success() {
            bail!("price history returned status {}", resp.status());
        }
        let body = resp.text().await.context("price history body")?;
        parse_chart(&body)
    }

    pub async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        let url = format!("{SUMMARY_BASE}/{ticker}");
        let resp = self
            .client
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES)])
            .send()
            .await
            .context("fundamentals request")?;
        if !resp.status().is_success() {
            bail!("fundamentals returned status {}", resp.status());
        }
        let body = resp.text().await.context("fundamentals body")?;
        parse_summary(&body)
    }
}

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: ChartOuter,
}
#[derive(Deserialize)]
struct ChartOuter {
    result: Option<Vec<ChartResult>>,
}
#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}
#[derive(Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}
#[derive(Deserialize)]
struct ChartQuote {
    close: Option<Vec<Option<f64>>>,
}

/// Rows without a close (halts, holidays) are dropped in lockstep with
/// their timestamps.
fn parse_chart(body: &str) -> Result<PriceHistory> {
    let envelope: ChartEnvelope = serde_json::from_str(body).context("parsing chart payload")?;

    let Some(result) = envelope.chart.result.unwrap_or_default().into_iter().next() else {
        return Ok(PriceHistory::default());
    };
    let raw_closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    let mut closes = Vec::with_capacity(raw_closes.len());
    let mut last_ts: Option<i64> = None;
    for (i, close) in raw_closes.into_iter().enumerate() {
        if let Some(close) = close {
            closes.push(close);
            last_ts = result.timestamp.get(i).copied().or(last_ts);
        }
    }

    let last_date = last_ts
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive());
    Ok(PriceHistory { closes, last_date })
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryOuter,
}
#[derive(Deserialize)]
struct SummaryOuter {
    result: Option<Vec<SummaryBlock>>,
}
#[derive(Deserialize)]
struct SummaryBlock {
    #[serde(rename = "assetProfile")]
    asset_profile: Option<AssetProfile>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatistics>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
}
#[derive(Deserialize)]
struct AssetProfile {
    sector: Option<String>,
}
#[derive(Deserialize)]
struct SummaryDetail {
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNum>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNum>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawNum>,
}
#[derive(Deserialize)]
struct KeyStatistics {
    #[serde(rename = "priceToBook")]
    price_to_book: Option<RawNum>,
    #[serde(rename = "trailingEps")]
    trailing_eps: Option<RawNum>,
}
#[derive(Deserialize)]
struct FinancialData {
    #[serde(rename = "returnOnEquity")]
    return_on_equity: Option<RawNum>,
}
#[derive(Deserialize, Default)]
struct RawNum {
    raw: Option<f64>,
}

fn raw(num: Option<RawNum>) -> Option<f64> {
    num.and_then(|n| n.raw)
}

fn parse_summary(body: &str) -> Result<Fundamentals> {
    let envelope: SummaryEnvelope =
        serde_json::from_str(body).context("parsing quoteSummary payload")?;

    let Some(block) = envelope
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
    else {
        return Ok(Fundamentals::default());
    };

    let mut out = Fundamentals::default();
    if let Some(profile) = block.asset_profile {
        out.sector = profile.sector;
    }
    if let Some(detail) = block.summary_detail {
        out.market_cap = raw(detail.market_cap);
        out.per = raw(detail.trailing_pe);
        out.dividend_yield = raw(detail.dividend_yield);
    }
    if let Some(stats) = block.key_statistics {
        out.pbv = raw(stats.price_to_book);
        out.eps = raw(stats.trailing_eps);
    }
    if let Some(financial) = block.financial_data {
        out.roe = raw(financial.return_on_equity);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_payload_drops_null_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1755000000, 1755086400, 1755172800],
                    "indicators": {"quote": [{"close": [100.0, null, 102.5]}]}
                }],
                "error": null
            }
        }"#;
        let history = parse_chart(body).unwrap();
        assert_eq!(history.closes, vec![100.0, 102.5]);
        let date = history.last_date.unwrap();
        assert_eq!(date, DateTime::from_timestamp(1755172800, 0).unwrap().date_naive());
    }

    #[test]
    fn chart_payload_with_no_result_is_empty() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#;
        let history = parse_chart(body).unwrap();
        assert!(history.closes.is_empty());
        assert!(history.last_date.is_none());
    }

    #[test]
    fn summary_payload_extracts_raw_numbers() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "assetProfile": {"sector": "Financial Services"},
                    "summaryDetail": {
                        "marketCap": {"raw": 1.2e15, "fmt": "1.2Q"},
                        "trailingPE": {"raw": 17.8},
                        "dividendYield": {"raw": 0.031}
                    },
                    "defaultKeyStatistics": {
                        "priceToBook": {"raw": 4.2},
                        "trailingEps": {"raw": 540.5}
                    },
                    "financialData": {"returnOnEquity": {"raw": 0.21}}
                }],
                "error": null
            }
        }"#;
        let f = parse_summary(body).unwrap();
        assert_eq!(f.sector.as_deref(), Some("Financial Services"));
        assert_eq!(f.per, Some(17.8));
        assert_eq!(f.pbv, Some(4.2));
        assert_eq!(f.roe, Some(0.21));
        assert_eq!(f.dividend_yield, Some(0.031));
    }

    #[test]
    fn summary_payload_tolerates_missing_modules() {
        let body = r#"{"quoteSummary": {"result": [{"summaryDetail": {"trailingPE": null}}], "error": null}}"#;
        let f = parse_summary(body).unwrap();
        assert!(f.sector.is_none());
        assert!(f.per.is_none());
        assert!(f.market_cap.is_none());
    }
}
