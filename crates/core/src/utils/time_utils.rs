use chrono::{Datelike, Months, NaiveDate};

/// First calendar day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Adds whole months, clamping the day to the end of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// End of the calendar month `months` after the month containing `from`.
///
/// `month_end_after(2026-01-31, 1)` is `2026-02-28`.
pub fn month_end_after(from: NaiveDate, months: u32) -> NaiveDate {
    end_of_month(add_months(first_of_month(from), months))
}

/// First day of the calendar month `months` after the month containing `from`.
pub fn month_start_after(from: NaiveDate, months: u32) -> NaiveDate {
    add_months(first_of_month(from), months)
}

/// Whole calendar months from `start` to `end` (negative when `end` is earlier).
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year() - start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months
}
