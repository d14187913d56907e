//! Drives the calendar core the way a UI host would, printing each page as
//! text instead of drawing it.
mod agenda;
mod render;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{Local, NaiveDate};
use tessera_calendar::{
    CalendarDelegate, CalendarError, NavigationState, PageDirection, PagingCoordinator,
    config::{CalendarConfig, DisplayMode, StartWeekDay},
    date::{shift_days, shift_months},
};
use tracing::info;

use crate::agenda::Agenda;

struct Logger;

impl CalendarDelegate for Logger {
    fn page_will_change(&self, anchor: NaiveDate) {
        info!(%anchor, "page will change");
    }

    fn page_did_change(&self, anchor: NaiveDate) {
        info!(%anchor, "page did change");
    }

    fn date_selected(&self, date: NaiveDate) {
        info!(%date, "date selected");
    }

    fn date_arithmetic_degraded(&self, anchor: NaiveDate) {
        tracing::warn!(%anchor, "page generated with fallback dates");
    }
}

/// Runs the walkthrough.
pub fn run() -> Result<(), CalendarError> {
    let today = Local::now().date_naive();
    let logger = Arc::new(Logger);
    let agenda = Arc::new(Agenda::sample(today));

    let mut config = CalendarConfig::default().start_week_day(StartWeekDay::Monday);
    config.min_date = shift_months(today, -6);
    config.max_date = shift_months(today, 12);
    let mut nav = NavigationState::new(config.clone(), today, Some(today))?
        .with_delegate(&logger)
        .with_data_source(&agenda);

    println!("{}", render::page(&nav, 2));

    // Two quick taps on "next" and one on "previous" settle as a single
    // one-month move.
    let mut paging = PagingCoordinator::default();
    let start = Instant::now();
    for (offset, direction) in [
        (0, PageDirection::Next),
        (80, PageDirection::Next),
        (160, PageDirection::Previous),
    ] {
        paging.trigger(direction, &nav, start + Duration::from_millis(offset));
    }
    let settle = paging.tick(&mut nav, start + Duration::from_secs(1));
    info!(?settle, "coalesced taps settled");
    println!("{}", render::page(&nav, 2));

    if let Some(target) = shift_days(today, 3) {
        nav.select_date(target);
    }
    nav.set_config(config.display_mode(DisplayMode::Week))?;
    println!("{}", render::page(&nav, 3));
    Ok(())
}
