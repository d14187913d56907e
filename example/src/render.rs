use std::fmt::Write as _;

use chrono::Datelike;
use tessera_calendar::{NavigationState, grid::weekday_sequence, layout};

/// Renders the current page as a text grid, with event bars under each week
/// and "+N" markers for bars that do not fit in `max_rows`.
pub(crate) fn page(nav: &NavigationState, max_rows: usize) -> String {
    let page = nav.current_page();
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", page.anchor().format("%B %Y"));
    out.push_str("    ");
    for weekday in weekday_sequence(nav.config().start_week_day) {
        let _ = write!(out, "{:>5}", weekday.to_string());
    }
    out.push('\n');

    for week in page.weeks() {
        let _ = write!(out, "W{:02} ", nav.week_number(week[0].date()));
        for cell in week {
            let marker = match (cell.is_selected(), cell.is_today()) {
                (true, _) => '*',
                (false, true) => '!',
                _ if !cell.is_in_current_month() => '.',
                _ => ' ',
            };
            let _ = write!(out, "{:>4}{marker}", cell.date().day());
        }
        out.push('\n');

        let events = nav.events_for_week(week);
        let overlay = layout(&events, &week.map(|cell| cell.date()));
        for row in overlay.visible_rows(max_rows) {
            let mut line = vec![String::from("     "); week.len()];
            for bar in row {
                for slot in &mut line[bar.start_column()..=bar.end_column()] {
                    *slot = format!("{:<5.5}", bar.event().title);
                }
            }
            let _ = writeln!(out, "    {}", line.concat());
        }
        let hidden = overlay.overflow(max_rows);
        if hidden.iter().any(|count| *count > 0) {
            out.push_str("    ");
            for count in hidden {
                let label = if count > 0 { format!("+{count}") } else { String::new() };
                let _ = write!(out, "{label:>5}");
            }
            out.push('\n');
        }
    }
    out
}
