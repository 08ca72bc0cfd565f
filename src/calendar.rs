//! Whole-month calendar arithmetic

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{LoanError, Result};

/// Average month length used to convert day spans into months
pub const AVERAGE_DAYS_PER_MONTH: f64 = 30.44;

/// Advance `date` by `months` calendar months.
///
/// The day of month is kept; when the target month is shorter the surplus
/// days roll over into the following month (Jan 31 + 1 month = Mar 3 in a
/// common year, Mar 2 in a leap year).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    let total = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = i32::try_from(total.div_euclid(12))
        .map_err(|_| LoanError::invalid("date", "year out of range"))?;
    let month = total.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_days(Days::new(date.day() as u64 - 1)))
        .ok_or_else(|| LoanError::invalid("date", format!("{} + {} months is out of range", date, months)))
}

/// Number of average-length months from `from` to `to`, rounded up.
///
/// Negative when `to` lies before `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    months_between_with(from, to, AVERAGE_DAYS_PER_MONTH)
}

/// Same as [`months_between`] with an explicit month length
pub fn months_between_with(from: NaiveDate, to: NaiveDate, days_per_month: f64) -> i64 {
    let days = (to - from).num_days() as f64;
    (days / days_per_month).ceil() as i64
}
