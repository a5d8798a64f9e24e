//! Low-level cleanup helpers for raw scraped text.
//!
//! The portal renders everything for humans: whitespace padding and line
//! feeds inside table cells, currency symbols and non-breaking spaces in
//! prices, locale-formatted dates. These helpers reduce that display text
//! to stable machine values. They never fail; unparseable input degrades
//! to an empty string or to the [`INVALID_DATE`] sentinel.

use chrono::NaiveDate;

/// Sentinel stored in place of a date that matched none of the accepted
/// formats. Kept as a string so the history document round-trips as-is.
pub const INVALID_DATE: &str = "[Invalid Date]";

/// Collapses all whitespace runs (including line feeds) to single spaces
/// and trims the ends.
#[must_use]
pub fn clean_string(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips everything but digits and periods, treating commas as decimal
/// separators (`"1,09 €"` → `"1.09"`).
#[must_use]
pub fn extract_numeric_value(value: &str) -> String {
    value
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Cleans a scraped price cell down to a bare decimal string.
///
/// Returns an empty string when the cell held no numeric content at all;
/// callers treat that as missing data, not as a zero price.
#[must_use]
pub fn clean_price(value: &str) -> String {
    extract_numeric_value(&clean_string(value))
}

/// Canonicalizes a scraped date to ISO `YYYY-MM-DD`.
///
/// Already-ISO input is returned unchanged. Otherwise the portal's known
/// display formats are tried in order; day-first (`DD/MM/YYYY`) wins over
/// month-first when both would parse. Input matching no format yields
/// [`INVALID_DATE`] rather than an error.
#[must_use]
pub fn clean_date(value: &str) -> String {
    let raw = clean_string(value);
    if NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_ok() {
        return raw;
    }

    const FORMATS: [&str; 5] = ["%d/%m/%Y", "%m/%d/%Y", "%B %d, %Y", "%d-%b-%Y", "%Y/%m/%d"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&raw, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    INVALID_DATE.to_string()
}
