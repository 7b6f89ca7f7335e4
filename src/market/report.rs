// src/market/report.rs
// Turns closes + fundamentals into the /analyze reply: indicator
// snapshot, rule-based readings, and the formatted message itself.

use crate::fmtnum::{fmt_frac_pct, fmt_num, fmt_pct, human_num};
use crate::market::data::{Fundamentals, PriceHistory};
use crate::market::indicators::{pct_change_over, rsi, sma};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Technicals {
    pub close: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub rsi14: Option<f64>,
    pub ret_1d: Option<f64>,
    pub ret_5d: Option<f64>,
    pub ret_20d: Option<f64>,
}

pub fn technicals(closes: &[f64]) -> Technicals {
    Technicals {
        close: closes.last().copied(),
        ma20: sma(closes, 20),
        ma50: sma(closes, 50),
        rsi14: rsi(closes, 14),
        ret_1d: pct_change_over(closes, 1),
        ret_5d: pct_change_over(closes, 5),
        ret_20d: pct_change_over(closes, 20),
    }
}

/// Threshold read of the indicator snapshot.
pub fn technical_signal(t: &Technicals) -> String {
    let (Some(close), Some(ma20), Some(ma50), Some(rsi)) = (t.close, t.ma20, t.ma50, t.rsi14)
    else {
        return "Data belum cukup untuk indikator (butuh ~50 hari).".to_string();
    };

    if close > ma20 && ma20 > ma50 && rsi < 70.0 {
        "Bullish (close > MA20 > MA50) dan RSI belum overbought.".to_string()
    } else if close < ma20 && ma20 < ma50 && rsi > 30.0 {
        "Bearish (close < MA20 < MA50) dan RSI belum oversold.".to_string()
    } else if rsi >= 70.0 {
        "RSI overbought (>=70), rawan koreksi.".to_string()
    } else if rsi <= 30.0 {
        "RSI oversold (<=30), rawan rebound.".to_string()
    } else {
        "Netral / transisi (butuh konfirmasi).".to_string()
    }
}

/// Every matching valuation note, space-joined; a neutral line when none
/// match or the data is missing.
pub fn fundamental_signal(f: &Fundamentals) -> String {
    let mut notes: Vec<&str> = Vec::new();
    if matches!(f.per, Some(v) if v > 0.0 && v < 15.0) {
        notes.push("PER relatif rendah (<15).");
    }
    if matches!(f.pbv, Some(v) if v > 0.0 && v < 1.5) {
        notes.push("PBV relatif rendah (<1.5).");
    }
    if matches!(f.roe, Some(v) if v > 0.15) {
        notes.push("ROE kuat (>15%).");
    }
    if matches!(f.dividend_yield, Some(v) if v >= 0.03) {
        notes.push("Dividend yield menarik (>=3%).");
    }

    if notes.is_empty() {
        "Fundamental netral / data terbatas.".to_string()
    } else {
        notes.join(" ")
    }
}

pub fn compose_report(ticker: &str, history: &PriceHistory, f: &Fundamentals) -> String {
    let t = technicals(&history.closes);
    let date = history
        .last_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "*{ticker}*\n\
         **Tanggal data:** {date}\n\
         **Close:** {close}\n\
         **Return 1D / 5D / 20D:** {r1} / {r5} / {r20}\n\
         **MA20 / MA50:** {ma20} / {ma50}\n\
         **RSI14:** {rsi}\n\
         **Teknikal:** {technical}\n\
         \n\
         *Fundamental*\n\
         **Sektor:** {sector}\n\
         **Market cap:** {mcap}\n\
         **PER / PBV:** {per} / {pbv}\n\
         **ROE / EPS:** {roe} / {eps}\n\
         **Div yield:** {dy}\n\
         **Fundamental:** {fundamental}\n\
         \n\
         _Catatan: ringkasan otomatis, bukan rekomendasi investasi._",
        close = fmt_num(t.close, 2),
        r1 = fmt_pct(t.ret_1d),
        r5 = fmt_pct(t.ret_5d),
        r20 = fmt_pct(t.ret_20d),
        ma20 = fmt_num(t.ma20, 2),
        ma50 = fmt_num(t.ma50, 2),
        rsi = fmt_num(t.rsi14, 2),
        technical = technical_signal(&t),
        sector = f.sector.as_deref().unwrap_or("n/a"),
        mcap = human_num(f.market_cap),
        per = fmt_num(f.per, 2),
        pbv = fmt_num(f.pbv, 2),
        roe = fmt_frac_pct(f.roe),
        eps = fmt_num(f.eps, 2),
        dy = fmt_frac_pct(f.dividend_yield),
        fundamental = fundamental_signal(f),
    )
}
