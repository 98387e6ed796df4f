// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" CSV/number handling so the rest
// of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a cell into a nonnegative count while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts floats such as `12.0` (some exports write counts that way).
/// - Returns `None` for anything that cannot be safely parsed; the caller
///   treats that as a missing value, never as an error.
pub fn parse_count(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f.round() as u64),
        _ => None,
    }
}

/// Parse a `연월` key in YYYYMM form.
///
/// Returns `None` unless the value is numeric and its month part falls in
/// 1..=12; rows with an unusable key are skipped upstream.
pub fn parse_year_month(s: &str) -> Option<u32> {
    let s = s.trim();
    let ym = s.parse::<u32>().ok()?;
    let month = ym % 100;
    if ym < 100 || !(1..=12).contains(&month) {
        return None;
    }
    Some(ym)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in metric tiles and console messages (e.g., `9,855`).
    n.to_formatted_string(&Locale::en)
}

/// Format a signed delta with an explicit sign, e.g. `+1,234` or `-56`.
pub fn format_signed(n: i64) -> String {
    if n >= 0 {
        format!("+{}", format_int(n))
    } else {
        format_int(n)
    }
}
