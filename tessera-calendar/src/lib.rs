//! Calendar core for tessera: month and week grids, bounded paged navigation
//! and event row layout, independent of any renderer.
//!
//! # Usage
//!
//! Create a [`NavigationState`](navigation::NavigationState) from a
//! [`CalendarConfig`](config::CalendarConfig), render its window of pages, and
//! feed drags and button presses through a
//! [`PagingCoordinator`](paging::PagingCoordinator) ticked from the frame loop.
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use chrono::NaiveDate;
//! use tessera_calendar::{
//!     config::{CalendarConfig, StartWeekDay},
//!     navigation::{NavigationState, PageDirection},
//!     paging::PagingCoordinator,
//! };
//!
//! let config = CalendarConfig::default().start_week_day(StartWeekDay::Monday);
//! let start = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//! let mut nav = NavigationState::new(config, start, None).unwrap();
//! assert_eq!(nav.current_page().week_count(), 5);
//!
//! let mut paging = PagingCoordinator::default();
//! let now = Instant::now();
//! paging.trigger(PageDirection::Next, &nav, now);
//! paging.tick(&mut nav, now + Duration::from_millis(300));
//! assert_eq!(nav.displayed_date(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (`debug` for navigation decisions,
//! `warn` for degraded date arithmetic) and never installs a subscriber.
#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod config;
pub mod date;
pub mod delegate;
pub mod error;
pub mod grid;
pub mod navigation;
pub mod overlay;
pub mod paging;

pub use chrono;

pub use crate::{
    config::CalendarConfig,
    delegate::{CalendarDataSource, CalendarDelegate},
    error::CalendarError,
    grid::{CalendarDay, CalendarPage, CalendarWeek},
    navigation::{JumpOutcome, NavigationState, PageDirection},
    overlay::{CalendarEvent, WeekOverlay, layout},
    paging::{PagingCoordinator, PagingSettle},
};
