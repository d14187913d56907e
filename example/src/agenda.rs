use chrono::NaiveDate;
use tessera_calendar::{CalendarDataSource, CalendarEvent, date::shift_days};

/// In-memory event store standing in for the host's calendar database.
pub(crate) struct Agenda {
    events: Vec<CalendarEvent>,
}

impl Agenda {
    pub(crate) fn sample(today: NaiveDate) -> Self {
        let at = |days: i64| shift_days(today, days).unwrap_or(today);
        let events = vec![
            CalendarEvent::all_day("Sprint", today, at(4)).id("sprint"),
            CalendarEvent::all_day("Review", at(2), at(2)).id("review"),
            CalendarEvent::all_day("Offsite", at(3), at(9)).id("offsite"),
            CalendarEvent::all_day("Retro", at(4), at(4)).id("retro"),
            CalendarEvent::all_day("Launch", at(40), at(40)).id("launch"),
        ];
        Self { events }
    }
}

impl CalendarDataSource for Agenda {
    fn events_for_date(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        self.events
            .iter()
            .filter(|event| event.occurs_on(date))
            .cloned()
            .collect()
    }

    fn events_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<CalendarEvent> {
        self.events
            .iter()
            .filter(|event| event.start_date() <= end && event.end_date() >= start)
            .cloned()
            .collect()
    }
}
