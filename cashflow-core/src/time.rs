//! Calendar helpers: month keys, month-end arithmetic, timezone-aware "today".

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Year-month key in `YYYY-MM` form.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Day number of the last calendar day of `date`'s month.
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(date.day())
}

/// Calendar days remaining after `today`, within the current month.
/// Zero on the last day of the month.
pub fn days_left_in_month(today: NaiveDate) -> u32 {
    last_day_of_month(today) - today.day()
}

/// Today's date in an IANA timezone like "Asia/Jerusalem".
pub fn today_in_tz(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}
