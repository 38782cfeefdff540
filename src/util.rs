//! Small shared helpers: price and date formatting.

use chrono::NaiveDate;

/// Format an integer price with thousands separators, e.g. 1200 -> "1,200".
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human-readable date for the poster title and the tweet caption,
/// e.g. "3 August 2026".
pub fn human_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}
