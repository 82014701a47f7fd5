// Cell parsing and display formatting.
//
// Spreadsheet exports carry currency symbols, thousands separators and
// accounting-style negatives; everything past this module sees plain `f64`.
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

/// Names at or under this many characters are displayed as-is.
pub const SHORT_NAME_LIMIT: usize = 25;

// Legal-entity words that separate a trading name from the trustee/company
// suffix, e.g. "Acme Pty Ltd t/as Green Solutions".
static ENTITY_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:of|as|atf|t/as|pty\.?|ltd\.?|limited)(?:\s+|$)").unwrap()
});

/// Parse a spreadsheet cell into `f64`.
///
/// - Trims whitespace and surrounding quotes.
/// - Strips `$` and thousands separators.
/// - `(1,234)` is read as `-1234`.
/// - Returns `None` for blanks and anything non-numeric.
pub fn parse_amount(s: Option<&str>) -> Option<f64> {
    let s = s?.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }
    let cleaned = s.replace([',', '$'], "");
    let cleaned = cleaned.trim();
    if let Some(inner) = cleaned.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shorten a customer name for chart labels.
///
/// Long names are cut at the first legal-entity separator word; short names
/// and names without a separator come back unchanged.
pub fn shorten_name(name: &str) -> String {
    if name.chars().count() <= SHORT_NAME_LIMIT {
        return name.to_string();
    }
    let trimmed = name.trim();
    match ENTITY_SEPARATORS.split(trimmed).next().map(str::trim) {
        Some(head) if !head.is_empty() => head.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Compact dollar display: `$1.50M`, `$45K`, `$750`.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.0}K", value / 1_000.0)
    } else {
        format!("${:.0}", value)
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_val: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
