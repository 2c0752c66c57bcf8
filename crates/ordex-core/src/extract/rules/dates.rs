//! Order date extraction.
//!
//! Dates are normalized to canonical ISO (YYYY-MM-DD). Calendar-impossible
//! candidates (month 13, day 32, Feb 29 outside a leap year) are silent
//! no-matches; `NaiveDate::from_ymd_opt` is the gatekeeper.

use chrono::NaiveDate;

use crate::extract::locale::LocaleRules;

use super::patterns::{DATE_DAY_FIRST, DATE_ISO, DATE_MONTH_FIRST, DATE_NUMERIC};
use super::ExtractionMatch;

/// Extract the order date, labeled line first, any date second.
pub fn extract_order_date(text: &str, rules: &LocaleRules) -> Option<ExtractionMatch<NaiveDate>> {
    if let Some(caps) = rules.order_date_label.captures(text) {
        let fragment = &caps[1];
        if let Some(date) = parse_date_str(fragment, rules) {
            return Some(ExtractionMatch::new(date, 0.95, fragment.trim()));
        }
    }

    first_date(text, rules).map(|(date, source)| ExtractionMatch::new(date, 0.7, source))
}

/// Parse one date out of a short fragment, most specific ordering first.
pub fn parse_date_str(s: &str, rules: &LocaleRules) -> Option<NaiveDate> {
    // Month D, Y ("December 15, 2023")
    for caps in DATE_MONTH_FIRST.captures_iter(s) {
        if let Some(month) = rules.month_number(&caps[1]) {
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    // D Month Y / D. Month Y ("15. Dezember 2023")
    for caps in DATE_DAY_FIRST.captures_iter(s) {
        if let Some(month) = rules.month_number(&caps[2]) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    // Y-M-D
    for caps in DATE_ISO.captures_iter(s) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    // Numeric D.M.Y or M/D/Y, ordering decided by locale.
    for caps in DATE_NUMERIC.captures_iter(s) {
        let first: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        let (day, month) = if rules.day_first_numeric {
            (first, second)
        } else {
            (second, first)
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

fn first_date(text: &str, rules: &LocaleRules) -> Option<(NaiveDate, String)> {
    text.lines().find_map(|line| {
        parse_date_str(line, rules).map(|date| (date, line.trim().to_string()))
    })
}

/// Canonical ISO form.
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
