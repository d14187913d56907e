//! Configuration surface of the calendar core.
//!
//! All types here are plain values. A [`CalendarConfig`] is read-only from the
//! core's point of view; changing layout-affecting fields goes through
//! [`NavigationState::set_config`](crate::navigation::NavigationState::set_config),
//! which regenerates the displayed pages.
use chrono::{NaiveDate, Weekday};
use derive_setters::Setters;

use crate::error::CalendarError;

/// Whether a page shows a whole month or a single week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayMode {
    /// One month per page.
    #[default]
    Month,
    /// One week per page.
    Week,
}

/// How many weeks a month page contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonthStyle {
    /// Always six weeks (42 days).
    Fixed,
    /// Only as many weeks as the month needs.
    #[default]
    Dynamic,
}

/// First column of every week row, `0 = Sunday .. 6 = Saturday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StartWeekDay {
    /// Sunday.
    #[default]
    Sunday = 0,
    /// Monday.
    Monday = 1,
    /// Tuesday.
    Tuesday = 2,
    /// Wednesday.
    Wednesday = 3,
    /// Thursday.
    Thursday = 4,
    /// Friday.
    Friday = 5,
    /// Saturday.
    Saturday = 6,
}

impl StartWeekDay {
    /// All week days in index order.
    pub const ALL: [StartWeekDay; 7] = [
        StartWeekDay::Sunday,
        StartWeekDay::Monday,
        StartWeekDay::Tuesday,
        StartWeekDay::Wednesday,
        StartWeekDay::Thursday,
        StartWeekDay::Friday,
        StartWeekDay::Saturday,
    ];

    /// Returns the `0 = Sunday` based index.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Builds a start day from a `0 = Sunday` based index.
    pub fn from_index(index: u8) -> Result<Self, CalendarError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(CalendarError::InvalidStartWeekDay(index))
    }

    /// The matching `chrono` weekday.
    pub fn weekday(self) -> Weekday {
        match self {
            StartWeekDay::Sunday => Weekday::Sun,
            StartWeekDay::Monday => Weekday::Mon,
            StartWeekDay::Tuesday => Weekday::Tue,
            StartWeekDay::Wednesday => Weekday::Wed,
            StartWeekDay::Thursday => Weekday::Thu,
            StartWeekDay::Friday => Weekday::Fri,
            StartWeekDay::Saturday => Weekday::Sat,
        }
    }
}

impl TryFrom<u8> for StartWeekDay {
    type Error = CalendarError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

impl From<Weekday> for StartWeekDay {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_sunday() as usize]
    }
}

/// How tall a page is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeightStyle {
    /// The host sizes pages from available space.
    #[default]
    Flexible,
    /// Every week row has this fixed height in logical units.
    Fixed(f32),
}

impl HeightStyle {
    /// Row height for fixed styles.
    pub fn row_height(self) -> Option<f32> {
        match self {
            HeightStyle::Flexible => None,
            HeightStyle::Fixed(height) => Some(height),
        }
    }
}

/// Axis along which pages slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    /// Pages stack vertically.
    #[default]
    Vertical,
    /// Pages sit side by side.
    Horizontal,
}

/// How events are presented inside day cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventDisplayStyle {
    /// Horizontal bars laid out by [`crate::overlay::layout`].
    #[default]
    Bars,
    /// A dot per day that has events.
    Dots,
    /// A numeric per-day count.
    Count,
    /// Events are not shown.
    None,
}

/// Policy values driving grid generation and navigation.
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalendarConfig {
    /// Month or week pages.
    pub display_mode: DisplayMode,
    /// First column of every week.
    pub start_week_day: StartWeekDay,
    /// Week count policy for month pages.
    pub month_style: MonthStyle,
    /// Whether previous/next pages are generated for a sliding carousel.
    pub is_paging_enabled: bool,
    /// Whether paging moves the selection to today or the period anchor.
    pub auto_select: bool,
    /// Earliest reachable date.
    #[setters(strip_option)]
    pub min_date: Option<NaiveDate>,
    /// Latest reachable date.
    #[setters(strip_option)]
    pub max_date: Option<NaiveDate>,
    /// Page height policy.
    pub height_style: HeightStyle,
    /// Axis pages slide along.
    pub scroll_direction: ScrollDirection,
    /// Whether hosts render a week-number column.
    pub show_week_number: bool,
    /// How events are presented.
    pub event_display_style: EventDisplayStyle,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Month,
            start_week_day: StartWeekDay::Sunday,
            month_style: MonthStyle::Dynamic,
            is_paging_enabled: true,
            auto_select: true,
            min_date: None,
            max_date: None,
            height_style: HeightStyle::Flexible,
            scroll_direction: ScrollDirection::Vertical,
            show_week_number: false,
            event_display_style: EventDisplayStyle::Bars,
        }
    }
}

impl CalendarConfig {
    /// Checks that the date bounds are ordered.
    pub fn validate(&self) -> Result<(), CalendarError> {
        match (self.min_date, self.max_date) {
            (Some(min), Some(max)) if min > max => {
                Err(CalendarError::InvalidDateRange { min, max })
            }
            _ => Ok(()),
        }
    }

    /// Returns `true` when `date` lies within the configured bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min_date.is_none_or(|min| date >= min) && self.max_date.is_none_or(|max| date <= max)
    }

    /// Clamps `date` into the configured bounds.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        let date = self.min_date.map_or(date, |min| date.max(min));
        self.max_date.map_or(date, |max| date.min(max))
    }

    /// Returns `true` when the inclusive range `first..=last` overlaps the
    /// configured bounds.
    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.min_date.is_none_or(|min| last >= min) && self.max_date.is_none_or(|max| first <= max)
    }

    /// Whether a change from `self` to `other` requires regenerating pages.
    pub fn affects_layout(&self, other: &CalendarConfig) -> bool {
        self.display_mode != other.display_mode
            || self.start_week_day != other.start_week_day
            || self.month_style != other.month_style
            || self.is_paging_enabled != other.is_paging_enabled
    }
}
