//! Host-implemented hooks.
//!
//! Both traits have no-op defaults for every method, so hosts only implement
//! what they care about. The navigation state keeps [`Weak`](std::sync::Weak)
//! references to them; the host owns their lifetime.
use chrono::NaiveDate;

use crate::overlay::CalendarEvent;

/// Receives navigation and selection notifications.
///
/// `page_did_change` and `date_selected` fire at most once per committed
/// change.
pub trait CalendarDelegate: Send + Sync {
    /// A page change to the period anchored at `anchor` is about to start.
    ///
    /// While a slide is in flight this fires again for every accepted
    /// trigger, each time with the updated target. A slide that cancels out
    /// or is overtaken by other navigation is not followed by
    /// `page_did_change`; the last target announced before a commit is the
    /// committed one.
    fn page_will_change(&self, _anchor: NaiveDate) {}

    /// The current page now shows the period anchored at `anchor`.
    fn page_did_change(&self, _anchor: NaiveDate) {}

    /// The selection changed to `date`.
    fn date_selected(&self, _date: NaiveDate) {}

    /// A page anchored at `anchor` was generated with fallback dates because
    /// calendar arithmetic left the representable range.
    fn date_arithmetic_degraded(&self, _anchor: NaiveDate) {}
}

/// Supplies events on demand. The core never stores events.
pub trait CalendarDataSource: Send + Sync {
    /// Events occurring on `date`.
    fn events_for_date(&self, _date: NaiveDate) -> Vec<CalendarEvent> {
        Vec::new()
    }

    /// Events overlapping the inclusive range `start..=end`.
    ///
    /// Preferred over [`events_for_date`](Self::events_for_date) since a week
    /// or month is fetched with a single call.
    fn events_in_range(&self, _start: NaiveDate, _end: NaiveDate) -> Vec<CalendarEvent> {
        Vec::new()
    }
}
