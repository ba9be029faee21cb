//! Number formatting for tooltips and SVG attributes

/// Minus sign used for negative values, as d3-format does
const MINUS: char = '\u{2212}';

/// Format a value with thousands separators and no decimals (d3 `",.0f"`)
///
/// Halves round away from zero. Non-finite values (a missing amount that slipped
/// through as NaN) format as `0` instead of `NaN`.
#[must_use]
pub fn format_value(value: f64) -> String {
    let rounded = if value.is_finite() { value.round() } else { 0.0 };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push(MINUS);
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a coordinate for an SVG attribute
///
/// At most three decimals, trailing zeros dropped, `-0` written as `0`.
#[must_use]
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut text = format!("{value:.3}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}
