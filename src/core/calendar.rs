//! Business-calendar rule deciding when the monthly issuance fires.
//!
//! The trigger date is the last business day of the month: the final
//! calendar day, rolled back to Friday when it falls on a weekend. Only
//! weekends are considered — public holidays are deliberately out of
//! scope for now.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::types::Period;

/// The final calendar day of the period's month.
pub fn last_calendar_day(period: Period) -> NaiveDate {
    let first = period.first_day();
    // First day of the next month, minus one day.
    let next_month = if period.month() == 12 {
        NaiveDate::from_ymd_opt(period.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(period.year(), period.month() + 1, 1)
    };
    next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(first)
}

/// The last business day of the period's month: Saturday rolls back one
/// day, Sunday rolls back two, both landing on Friday.
pub fn last_business_day(period: Period) -> NaiveDate {
    let last = last_calendar_day(period);
    let rollback = match last.weekday() {
        Weekday::Sat => 1,
        Weekday::Sun => 2,
        _ => 0,
    };
    last.checked_sub_days(Days::new(rollback)).unwrap_or(last)
}

/// True iff `date` is the last business day of its own month.
pub fn is_last_business_day(date: NaiveDate) -> bool {
    date == last_business_day(Period::from_date(date))
}
