//! Gregorian calendar arithmetic shared by the grid generator and the
//! navigation state.
//!
//! Every shifting helper is checked: it returns `None` instead of panicking
//! when the result would leave the range `chrono` can represent. Callers decide
//! how to degrade.
use chrono::{Datelike, Days, Duration, Months, NaiveDate};

use crate::config::{DisplayMode, StartWeekDay};

/// Returns the first day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Returns the last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

/// Number of days in the given month (1-12), or 0 when the month is not a
/// valid calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(0)
}

/// Number of days between the start of the week containing `date` and `date`.
pub fn leading_offset(date: NaiveDate, start_week_day: StartWeekDay) -> u32 {
    let weekday = date.weekday().num_days_from_sunday();
    (weekday + 7 - u32::from(start_week_day.index())) % 7
}

/// First day of the week containing `date`.
pub fn week_start(date: NaiveDate, start_week_day: StartWeekDay) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(leading_offset(date, start_week_day))))
}

/// Adds (or subtracts) whole months, clamping the day to the target month.
pub fn shift_months(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let months = Months::new(delta.unsigned_abs());
    if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// Adds (or subtracts) whole days.
pub fn shift_days(date: NaiveDate, delta: i64) -> Option<NaiveDate> {
    Duration::try_days(delta).and_then(|duration| date.checked_add_signed(duration))
}

/// Adds (or subtracts) whole weeks.
pub fn shift_weeks(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    shift_days(date, i64::from(delta) * 7)
}

/// Signed number of calendar months from `from`'s month to `to`'s month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let years = to.year() - from.year();
    let months = to.month() as i32 - from.month() as i32;
    years * 12 + months
}

/// ISO-8601 week number of `date`.
pub fn week_of_year(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Anchor of the period containing `date`: the first of the month in month
/// mode, the week start in week mode.
pub(crate) fn period_anchor(
    date: NaiveDate,
    mode: DisplayMode,
    start_week_day: StartWeekDay,
) -> Option<NaiveDate> {
    match mode {
        DisplayMode::Month => Some(start_of_month(date)),
        DisplayMode::Week => week_start(date, start_week_day),
    }
}

/// Last day of the period starting at `anchor`.
pub(crate) fn period_end(anchor: NaiveDate, mode: DisplayMode) -> Option<NaiveDate> {
    match mode {
        DisplayMode::Month => Some(end_of_month(anchor)),
        DisplayMode::Week => shift_days(anchor, 6),
    }
}

/// Shifts a period anchor by `delta` months or weeks.
pub(crate) fn shift_period(anchor: NaiveDate, delta: i32, mode: DisplayMode) -> Option<NaiveDate> {
    match mode {
        DisplayMode::Month => shift_months(anchor, delta),
        DisplayMode::Week => shift_weeks(anchor, delta),
    }
}

/// Number of periods between two anchors produced by [`period_anchor`].
pub(crate) fn period_delta(from: NaiveDate, to: NaiveDate, mode: DisplayMode) -> i64 {
    match mode {
        DisplayMode::Month => i64::from(months_between(from, to)),
        DisplayMode::Week => (to - from).num_days().div_euclid(7),
    }
}
