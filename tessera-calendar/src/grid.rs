//! Day-grid generation for month and week pages.
//!
//! Pages are immutable snapshots. Whenever the displayed period, the selection
//! or a layout-affecting configuration value changes, the navigation state
//! throws the old pages away and generates new ones with the functions below.
use chrono::{Datelike, NaiveDate, Weekday};
use smallvec::SmallVec;
use tracing::warn;

use crate::{
    config::{MonthStyle, StartWeekDay},
    date::{days_in_month, leading_offset, shift_days, start_of_month, week_start},
};

/// Columns in every week row.
pub const DAYS_PER_WEEK: usize = 7;
/// Rows in a month page using [`MonthStyle::Fixed`].
pub const FIXED_MONTH_WEEKS: usize = 6;

/// A single generated day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    date: NaiveDate,
    is_today: bool,
    is_selected: bool,
    is_in_current_month: bool,
}

impl CalendarDay {
    /// Returns the calendar date of this cell.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Whether this cell is the current day at generation time.
    pub fn is_today(&self) -> bool {
        self.is_today
    }

    /// Whether this cell is the selected day.
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Whether this cell belongs to the page's anchor month.
    pub fn is_in_current_month(&self) -> bool {
        self.is_in_current_month
    }
}

/// One row of seven consecutive days.
pub type CalendarWeek = [CalendarDay; DAYS_PER_WEEK];

/// One month's or week's worth of day cells, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarPage {
    anchor: NaiveDate,
    weeks: SmallVec<[CalendarWeek; FIXED_MONTH_WEEKS]>,
    degraded: bool,
}

impl CalendarPage {
    /// Date defining which month or week this page represents.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Week rows in date order.
    pub fn weeks(&self) -> &[CalendarWeek] {
        &self.weeks
    }

    /// Number of week rows.
    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    /// All day cells in date order.
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten()
    }

    /// First date shown on the page.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days().next().map(CalendarDay::date)
    }

    /// Last date shown on the page.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.weeks.last().map(|week| week[DAYS_PER_WEEK - 1].date)
    }

    /// Whether `date` appears anywhere on the page.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days().any(|day| day.date == date)
    }

    /// Returns the row containing `date`.
    pub fn week_containing(&self, date: NaiveDate) -> Option<&CalendarWeek> {
        self.weeks
            .iter()
            .find(|week| week.iter().any(|day| day.date == date))
    }

    /// Returns the selected cell, if it is on this page.
    pub fn selected_day(&self) -> Option<&CalendarDay> {
        self.days().find(|day| day.is_selected)
    }

    /// Whether any date on this page came from the arithmetic fallback.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Generates the month page containing `anchor`.
pub fn generate_month_page(
    anchor: NaiveDate,
    start_week_day: StartWeekDay,
    month_style: MonthStyle,
    selected: Option<NaiveDate>,
    today: NaiveDate,
) -> CalendarPage {
    let first = start_of_month(anchor);
    let offset = leading_offset(first, start_week_day);
    let weeks = weeks_in_month(anchor, start_week_day, month_style);
    let mut builder = PageBuilder::new(first, selected, today);
    let grid_start = builder.shift(first, -i64::from(offset));
    for index in 0..weeks * DAYS_PER_WEEK {
        let date = builder.shift(grid_start, index as i64);
        builder.push(date);
    }
    builder.finish()
}

/// Generates the single-week page containing `anchor`.
pub fn generate_week_page(
    anchor: NaiveDate,
    start_week_day: StartWeekDay,
    selected: Option<NaiveDate>,
    today: NaiveDate,
) -> CalendarPage {
    let mut builder = PageBuilder::new(anchor, selected, today);
    let start = week_start(anchor, start_week_day).unwrap_or_else(|| builder.degrade(anchor));
    for index in 0..DAYS_PER_WEEK {
        let date = builder.shift(start, index as i64);
        builder.push(date);
    }
    builder.finish()
}

/// Number of week rows a month page for `anchor` needs.
pub fn weeks_in_month(
    anchor: NaiveDate,
    start_week_day: StartWeekDay,
    month_style: MonthStyle,
) -> usize {
    match month_style {
        MonthStyle::Fixed => FIXED_MONTH_WEEKS,
        MonthStyle::Dynamic => {
            let offset = leading_offset(start_of_month(anchor), start_week_day);
            let days = offset + days_in_month(anchor.year(), anchor.month());
            days.div_ceil(DAYS_PER_WEEK as u32) as usize
        }
    }
}

/// Week days in column order, for header rows.
pub fn weekday_sequence(start_week_day: StartWeekDay) -> [Weekday; DAYS_PER_WEEK] {
    let mut days = [start_week_day.weekday(); DAYS_PER_WEEK];
    for idx in 1..DAYS_PER_WEEK {
        days[idx] = days[idx - 1].succ();
    }
    days
}

struct PageBuilder {
    anchor: NaiveDate,
    selected: Option<NaiveDate>,
    today: NaiveDate,
    days: SmallVec<[CalendarDay; DAYS_PER_WEEK * FIXED_MONTH_WEEKS]>,
    degraded: bool,
}

impl PageBuilder {
    fn new(anchor: NaiveDate, selected: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            anchor,
            selected,
            today,
            days: SmallVec::new(),
            degraded: false,
        }
    }

    fn shift(&mut self, date: NaiveDate, days: i64) -> NaiveDate {
        shift_days(date, days).unwrap_or_else(|| self.degrade(date))
    }

    /// Falls back to the current day when date arithmetic fails.
    fn degrade(&mut self, from: NaiveDate) -> NaiveDate {
        if !self.degraded {
            warn!(
                anchor = %self.anchor,
                %from,
                "calendar date arithmetic out of range, falling back to today"
            );
        }
        self.degraded = true;
        self.today
    }

    fn push(&mut self, date: NaiveDate) {
        self.days.push(CalendarDay {
            date,
            is_today: date == self.today,
            is_selected: self.selected == Some(date),
            is_in_current_month: date.year() == self.anchor.year()
                && date.month() == self.anchor.month(),
        });
    }

    fn finish(self) -> CalendarPage {
        let weeks = self
            .days
            .chunks_exact(DAYS_PER_WEEK)
            .filter_map(|chunk| <CalendarWeek>::try_from(chunk).ok())
            .collect();
        CalendarPage {
            anchor: self.anchor,
            weeks,
            degraded: self.degraded,
        }
    }
}
