//! Row layout for multi-day event bars over a single week.
//!
//! Events are clipped to the week, mapped to day columns and packed into rows
//! first-fit in start-column order. For intervals this yields the minimum
//! number of rows, which equals the largest number of events sharing a day.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derive_setters::Setters;

use crate::grid::DAYS_PER_WEEK;

/// RGBA color in linear `0.0..=1.0` components.
pub type EventColor = [f32; 4];

/// A host-owned event.
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarEvent {
    /// Stable identifier, used to de-duplicate per-day queries.
    #[setters(strip_option, into)]
    pub id: Option<String>,
    /// Display title.
    #[setters(into)]
    pub title: String,
    /// Start instant.
    pub start: NaiveDateTime,
    /// End instant. An end before `start` is treated as `start`.
    pub end: NaiveDateTime,
    /// Bar background.
    #[setters(strip_option)]
    pub background_color: Option<EventColor>,
    /// Bar text color.
    #[setters(strip_option)]
    pub text_color: Option<EventColor>,
}

impl CalendarEvent {
    /// Creates an event spanning `start..=end`.
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: None,
            title: title.into(),
            start,
            end,
            background_color: None,
            text_color: None,
        }
    }

    /// Creates an event covering whole days from `start` to `end`.
    pub fn all_day(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(
            title,
            start.and_time(NaiveTime::MIN),
            end.and_time(NaiveTime::MIN),
        )
    }

    /// First day the event covers.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last day the event covers.
    pub fn end_date(&self) -> NaiveDate {
        if self.end < self.start {
            self.start.date()
        } else {
            self.end.date()
        }
    }

    /// Whether the event covers `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date <= self.end_date()
    }
}

/// An event placed on the week grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedEvent<'a> {
    event: &'a CalendarEvent,
    start_column: usize,
    end_column: usize,
    row: usize,
}

impl<'a> PositionedEvent<'a> {
    /// The underlying event.
    pub fn event(&self) -> &'a CalendarEvent {
        self.event
    }

    /// First covered column (`0..7`).
    pub fn start_column(&self) -> usize {
        self.start_column
    }

    /// Last covered column, inclusive.
    pub fn end_column(&self) -> usize {
        self.end_column
    }

    /// Number of covered columns.
    pub fn span(&self) -> usize {
        self.end_column - self.start_column + 1
    }

    /// Row index, `0` being the top row.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Whether this bar covers `column`.
    pub fn covers(&self, column: usize) -> bool {
        (self.start_column..=self.end_column).contains(&column)
    }
}

/// Result of [`layout`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeekOverlay<'a> {
    rows: Vec<Vec<PositionedEvent<'a>>>,
}

impl<'a> WeekOverlay<'a> {
    /// Rows in top-to-bottom order; bars inside a row are in start order.
    pub fn rows(&self) -> &[Vec<PositionedEvent<'a>>] {
        &self.rows
    }

    /// Number of rows needed to show every bar.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether no event touches the week.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every placed bar, row by row.
    pub fn events(&self) -> impl Iterator<Item = &PositionedEvent<'a>> {
        self.rows.iter().flatten()
    }

    /// Rows that fit when only `max_rows` can be rendered.
    pub fn visible_rows(&self, max_rows: usize) -> &[Vec<PositionedEvent<'a>>] {
        &self.rows[..self.rows.len().min(max_rows)]
    }

    /// Per-day count of bars hidden because their row is `>= max_rows`,
    /// for "+N" indicators.
    pub fn overflow(&self, max_rows: usize) -> [usize; DAYS_PER_WEEK] {
        let mut hidden = [0; DAYS_PER_WEEK];
        for event in self.events().filter(|event| event.row >= max_rows) {
            for count in &mut hidden[event.start_column..=event.end_column] {
                *count += 1;
            }
        }
        hidden
    }
}

/// Lays out `events` over the seven `week` dates.
///
/// Events outside the week are dropped. Among events starting on the same
/// column the caller's order is kept.
pub fn layout<'a>(events: &'a [CalendarEvent], week: &[NaiveDate; DAYS_PER_WEEK]) -> WeekOverlay<'a> {
    let week_start = week[0];
    let week_end = week[DAYS_PER_WEEK - 1];
    let column_of = |date: NaiveDate| week.iter().position(|day| *day == date);

    let mut placed: Vec<PositionedEvent<'a>> = events
        .iter()
        .filter(|event| event.start_date() <= week_end && event.end_date() >= week_start)
        .filter_map(|event| {
            let start_column = column_of(event.start_date().max(week_start))?;
            let end_column = column_of(event.end_date().min(week_end))?;
            Some(PositionedEvent {
                event,
                start_column,
                end_column,
                row: 0,
            })
        })
        .collect();
    placed.sort_by_key(|event| event.start_column);

    let mut rows: Vec<Vec<PositionedEvent<'a>>> = Vec::new();
    for mut event in placed {
        let free_row = rows.iter().position(|row| {
            row.last()
                .is_some_and(|last| last.end_column < event.start_column)
        });
        match free_row {
            Some(index) => {
                event.row = index;
                rows[index].push(event);
            }
            None => {
                event.row = rows.len();
                rows.push(vec![event]);
            }
        }
    }
    WeekOverlay { rows }
}

/// Number of bar rows fitting in `height`, reserving `more_height` for the
/// "+N" indicator line.
pub fn max_rows_for_height(height: f32, row_height: f32, spacing: f32, more_height: f32) -> usize {
    let row = row_height + spacing;
    if row <= 0.0 || !height.is_finite() {
        return 0;
    }
    let rows = ((height - more_height) / row).floor();
    if rows <= 0.0 { 0 } else { rows as usize }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week_of(start: NaiveDate) -> [NaiveDate; DAYS_PER_WEEK] {
        std::array::from_fn(|i| start + chrono::Days::new(i as u64))
    }

    fn titles<'a>(row: &[PositionedEvent<'a>]) -> Vec<&'a str> {
        row.iter().map(|e| e.event().title.as_str()).collect()
    }

    #[test]
    fn first_week_of_2025_packs_into_two_rows() {
        let events = vec![
            CalendarEvent::all_day("A", date(2025, 1, 1), date(2025, 1, 3)),
            CalendarEvent::all_day("B", date(2025, 1, 2), date(2025, 1, 2)),
            CalendarEvent::all_day("C", date(2025, 1, 1), date(2025, 1, 1)),
        ];
        let overlay = layout(&events, &week_of(date(2025, 1, 1)));
        assert_eq!(overlay.row_count(), 2);
        assert_eq!(titles(&overlay.rows()[0]), ["A"]);
        assert_eq!(titles(&overlay.rows()[1]), ["C", "B"]);
        let a = overlay.rows()[0][0];
        assert_eq!((a.start_column(), a.end_column(), a.span()), (0, 2, 3));
    }

    #[test]
    fn events_are_clipped_to_the_week() {
        let week = week_of(date(2025, 1, 5));
        let events = vec![
            CalendarEvent::all_day("long", date(2024, 12, 20), date(2025, 2, 1)),
            CalendarEvent::all_day("tail", date(2025, 1, 10), date(2025, 1, 14)),
            CalendarEvent::all_day("before", date(2025, 1, 1), date(2025, 1, 4)),
            CalendarEvent::all_day("after", date(2025, 1, 12), date(2025, 1, 12)),
        ];
        let overlay = layout(&events, &week);
        let placed: Vec<_> = overlay
            .events()
            .map(|e| (e.event().title.as_str(), e.start_column(), e.end_column()))
            .collect();
        assert_eq!(placed, [("long", 0, 6), ("tail", 5, 6)]);
    }

    #[test]
    fn inverted_event_is_zero_width_at_start() {
        let start = date(2025, 1, 3).and_hms_opt(10, 0, 0).unwrap();
        let end = date(2025, 1, 1).and_hms_opt(9, 0, 0).unwrap();
        let events = vec![CalendarEvent::new("oops", start, end)];
        let overlay = layout(&events, &week_of(date(2024, 12, 29)));
        let event = overlay.rows()[0][0];
        assert_eq!((event.start_column(), event.end_column()), (5, 5));
    }

    #[test]
    fn equal_starts_keep_caller_order() {
        let day = date(2025, 1, 6);
        let events = vec![
            CalendarEvent::all_day("first", day, day),
            CalendarEvent::all_day("second", day, day),
            CalendarEvent::all_day("third", day, day),
        ];
        let overlay = layout(&events, &week_of(date(2025, 1, 5)));
        let order: Vec<_> = overlay.rows().iter().map(|row| titles(row)[0]).collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn overflow_counts_hidden_bars_per_day() {
        let monday = date(2025, 1, 6);
        let events = vec![
            CalendarEvent::all_day("a", monday, date(2025, 1, 8)),
            CalendarEvent::all_day("b", monday, monday),
            CalendarEvent::all_day("c", monday, date(2025, 1, 7)),
            CalendarEvent::all_day("d", date(2025, 1, 10), date(2025, 1, 10)),
        ];
        let overlay = layout(&events, &week_of(date(2025, 1, 5)));
        assert_eq!(overlay.row_count(), 3);
        assert_eq!(overlay.overflow(1), [0, 2, 1, 0, 0, 0, 0]);
        assert_eq!(overlay.overflow(3), [0; DAYS_PER_WEEK]);
        assert_eq!(overlay.visible_rows(1).len(), 1);
    }

    #[test]
    fn max_rows_reserve_the_more_line() {
        assert_eq!(max_rows_for_height(100.0, 16.0, 4.0, 20.0), 4);
        assert_eq!(max_rows_for_height(10.0, 16.0, 4.0, 20.0), 0);
        assert_eq!(max_rows_for_height(100.0, 0.0, 0.0, 0.0), 0);
    }

    /// Smallest row count achievable by any valid assignment, found by trying
    /// every assignment with increasing row counts.
    fn brute_force_rows(spans: &[(usize, usize)]) -> usize {
        let n = spans.len();
        if n == 0 {
            return 0;
        }
        for rows in 1..=n {
            let total = rows.pow(n as u32);
            for code in 0..total {
                let mut assignment = Vec::with_capacity(n);
                let mut rest = code;
                for _ in 0..n {
                    assignment.push(rest % rows);
                    rest /= rows;
                }
                let valid = (0..n).all(|i| {
                    (i + 1..n).all(|j| {
                        assignment[i] != assignment[j]
                            || spans[i].1 < spans[j].0
                            || spans[j].1 < spans[i].0
                    })
                });
                if valid {
                    return rows;
                }
            }
        }
        n
    }

    #[test]
    fn greedy_rows_match_brute_force_minimum() {
        let week_start = date(2025, 1, 5);
        let week = week_of(week_start);
        let mut seed: u32 = 0x2545_f491;
        let mut next = move |bound: u32| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed % bound
        };
        for _ in 0..200 {
            let count = 1 + next(6) as usize;
            let spans: Vec<(usize, usize)> = (0..count)
                .map(|_| {
                    let a = next(7) as usize;
                    let b = next(7) as usize;
                    (a.min(b), a.max(b))
                })
                .collect();
            let events: Vec<_> = spans
                .iter()
                .map(|&(s, e)| CalendarEvent::all_day("e", week[s], week[e]))
                .collect();
            let overlay = layout(&events, &week);
            assert_eq!(
                overlay.row_count(),
                brute_force_rows(&spans),
                "spans {spans:?}"
            );
            for row in overlay.rows() {
                assert!(row.windows(2).all(|w| w[0].end_column() < w[1].start_column()));
            }
        }
    }
}
