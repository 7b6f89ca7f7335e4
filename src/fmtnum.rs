//! Display helpers for metrics that may be missing.
//!
//! Market endpoints leave holes everywhere (suspended tickers, absent
//! fundamentals), so every formatter takes `Option<f64>` and renders
//! `n/a` for anything absent or non-finite.

/// Fixed-decimal rendering.
pub fn fmt_num(x: Option<f64>, decimals: usize) -> String {
    match x {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "n/a".to_string(),
    }
}

/// Percent rendering for values already expressed in percent (1.25 -> "1.25%").
pub fn fmt_pct(x: Option<f64>) -> String {
    match x {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "n/a".to_string(),
    }
}

/// Percent rendering for values reported as fractions (0.035 -> "3.50%").
pub fn fmt_frac_pct(x: Option<f64>) -> String {
    match x {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => "n/a".to_string(),
    }
}

/// Compact magnitude rendering with K/M/B/T suffixes.
pub fn human_num(x: Option<f64>) -> String {
    let v = match x {
        Some(v) if v.is_finite() => v,
        _ => return "n/a".to_string(),
    };
    let magnitude = v.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_render_na() {
        assert_eq!(fmt_num(None, 2), "n/a");
        assert_eq!(fmt_num(Some(f64::NAN), 2), "n/a");
        assert_eq!(fmt_pct(None), "n/a");
        assert_eq!(fmt_frac_pct(Some(f64::INFINITY)), "n/a");
        assert_eq!(human_num(None), "n/a");
    }

    #[test]
    fn fixed_decimals() {
        assert_eq!(fmt_num(Some(1234.5), 2), "1234.50");
        assert_eq!(fmt_num(Some(0.456), 1), "0.5");
    }

    #[test]
    fn percent_variants() {
        assert_eq!(fmt_pct(Some(1.25)), "1.25%");
        assert_eq!(fmt_frac_pct(Some(0.035)), "3.50%");
        assert_eq!(fmt_frac_pct(Some(0.1534)), "15.34%");
    }

    #[test]
    fn magnitude_suffixes() {
        assert_eq!(human_num(Some(950.0)), "950.00");
        assert_eq!(human_num(Some(1_250.0)), "1.25K");
        assert_eq!(human_num(Some(3_400_000.0)), "3.40M");
        assert_eq!(human_num(Some(7_800_000_000.0)), "7.80B");
        assert_eq!(human_num(Some(1_020_000_000_000.0)), "1.02T");
        assert_eq!(human_num(Some(-2_500_000.0)), "-2.50M");
    }
}
