//! Seller sales analytics: calendar-month buckets.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::types::{Money, Timestamp};

/// Number of calendar months reported by seller analytics, including the
/// current one.
pub const ANALYTICS_MONTHS: u32 = 6;

/// Sales for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySales {
    /// `YYYY-MM`.
    pub month: String,
    /// Abbreviated English month name, e.g. `"Jan"`.
    pub label: &'static str,
    pub sales: Money,
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// First day of the month `months_back` months before the month of `now`.
pub fn month_start(now: Timestamp, months_back: u32) -> NaiveDate {
    let total = now.year() * 12 + now.month0() as i32 - months_back as i32;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u32;
    // Day 1 of a month in range is always valid.
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(NaiveDate::MIN)
}

/// `YYYY-MM` key for a date.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Zero-filled buckets for the last `months` months (oldest first), filled
/// from `(YYYY-MM, amount)` rows. Rows outside the window are ignored and
/// rows for the same month are summed.
pub fn fill_months(now: Timestamp, months: u32, rows: &[(String, Money)]) -> Vec<MonthlySales> {
    (0..months)
        .rev()
        .map(|back| {
            let start = month_start(now, back);
            let key = month_key(start);
            let sales = rows
                .iter()
                .filter(|(k, _)| *k == key)
                .map(|(_, amount)| *amount)
                .sum();
            MonthlySales {
                label: MONTH_LABELS[start.month0() as usize],
                month: key,
                sales,
            }
        })
        .collect()
}
