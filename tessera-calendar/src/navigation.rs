//! Displayed/selected date state machine with bounded navigation.
//!
//! [`NavigationState`] is the single owner of the displayed period and the
//! selection. Every committed change regenerates the page window wholesale
//! and notifies the host delegate at most once.
use std::{
    fmt,
    sync::{Arc, Weak},
};

use chrono::{Local, NaiveDate};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    config::{CalendarConfig, DisplayMode},
    date::{period_anchor, period_delta, period_end, shift_days, shift_period, week_of_year},
    delegate::{CalendarDataSource, CalendarDelegate},
    error::CalendarError,
    grid::{CalendarPage, CalendarWeek, DAYS_PER_WEEK, generate_month_page, generate_week_page},
    overlay::CalendarEvent,
};

/// Direction of a single-page move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDirection {
    /// Towards earlier dates.
    Previous,
    /// Towards later dates.
    Next,
}

impl PageDirection {
    /// Signed period step for this direction.
    pub fn delta(self) -> i32 {
        match self {
            PageDirection::Previous => -1,
            PageDirection::Next => 1,
        }
    }

    /// Direction of a signed step, `None` for zero.
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta.signum() {
            1 => Some(PageDirection::Next),
            -1 => Some(PageDirection::Previous),
            _ => None,
        }
    }
}

/// What [`NavigationState::jump_to`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// The target is out of bounds or unreachable; nothing changed.
    Rejected,
    /// The target is already in the displayed period.
    AlreadyVisible,
    /// A single-page slide was requested; the paging coordinator commits it
    /// once the animation settles.
    Animate(PageDirection),
    /// The displayed period changed immediately.
    Committed,
}

/// How a committed page change treats the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Apply [`CalendarConfig::auto_select`].
    #[default]
    Auto,
    /// Leave the selection untouched.
    Preserve,
}

/// The generated pages around the displayed period.
///
/// With paging enabled it holds the previous, current and next pages for a
/// three-slide carousel; otherwise only the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationWindow {
    pages: SmallVec<[CalendarPage; 3]>,
}

impl NavigationWindow {
    /// Pages in date order.
    pub fn pages(&self) -> &[CalendarPage] {
        &self.pages
    }

    /// Index of the current page within [`pages`](Self::pages).
    pub fn current_index(&self) -> usize {
        if self.pages.len() == 3 { 1 } else { 0 }
    }

    /// Page for the displayed period.
    pub fn current(&self) -> &CalendarPage {
        &self.pages[self.current_index()]
    }

    /// Page before the displayed period, when paging.
    pub fn previous(&self) -> Option<&CalendarPage> {
        (self.pages.len() == 3).then(|| &self.pages[0])
    }

    /// Page after the displayed period, when paging.
    pub fn next(&self) -> Option<&CalendarPage> {
        (self.pages.len() == 3).then(|| &self.pages[2])
    }
}

type TodayFn = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Owner of the displayed period and the selection of one calendar instance.
pub struct NavigationState {
    config: CalendarConfig,
    displayed_date: NaiveDate,
    selected_date: Option<NaiveDate>,
    window: NavigationWindow,
    pending_animation: Option<PageDirection>,
    revision: u64,
    delegate: Option<Weak<dyn CalendarDelegate>>,
    data_source: Option<Weak<dyn CalendarDataSource>>,
    today: TodayFn,
}

impl fmt::Debug for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationState")
            .field("config", &self.config)
            .field("displayed_date", &self.displayed_date)
            .field("selected_date", &self.selected_date)
            .field("pending_animation", &self.pending_animation)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl NavigationState {
    /// Creates the navigation state for a calendar instance.
    ///
    /// `initial_date` and `selected` are clamped into the configured bounds.
    /// Fails when the bounds are inverted.
    pub fn new(
        config: CalendarConfig,
        initial_date: NaiveDate,
        selected: Option<NaiveDate>,
    ) -> Result<Self, CalendarError> {
        config.validate()?;
        let initial = config.clamp(initial_date);
        let selected_date = selected.map(|date| config.clamp(date));
        let mut state = Self {
            displayed_date: initial,
            selected_date,
            window: NavigationWindow {
                pages: SmallVec::new(),
            },
            pending_animation: None,
            revision: 0,
            delegate: None,
            data_source: None,
            today: Arc::new(|| Local::now().date_naive()),
            config,
        };
        state.displayed_date = state.anchor_of(initial);
        state.regenerate();
        Ok(state)
    }

    /// Replaces the clock used for "today" flags and auto-selection.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self.regenerate();
        self
    }

    /// Attaches a delegate. Only a weak reference is kept.
    pub fn with_delegate<D: CalendarDelegate + 'static>(mut self, delegate: &Arc<D>) -> Self {
        self.set_delegate(delegate);
        self
    }

    /// Attaches a data source. Only a weak reference is kept.
    pub fn with_data_source<S: CalendarDataSource + 'static>(mut self, source: &Arc<S>) -> Self {
        self.set_data_source(source);
        self
    }

    /// Replaces the delegate.
    pub fn set_delegate<D: CalendarDelegate + 'static>(&mut self, delegate: &Arc<D>) {
        let weak = Arc::downgrade(delegate) as Weak<dyn CalendarDelegate>;
        self.delegate = Some(weak);
    }

    /// Replaces the data source.
    pub fn set_data_source<S: CalendarDataSource + 'static>(&mut self, source: &Arc<S>) {
        let weak = Arc::downgrade(source) as Weak<dyn CalendarDataSource>;
        self.data_source = Some(weak);
    }

    /// Current configuration.
    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Anchor of the current page.
    pub fn displayed_date(&self) -> NaiveDate {
        self.displayed_date
    }

    /// Selected day, always within bounds.
    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Generated pages.
    pub fn window(&self) -> &NavigationWindow {
        &self.window
    }

    /// Page for the displayed period.
    pub fn current_page(&self) -> &CalendarPage {
        self.window.current()
    }

    /// Counter bumped on every committed page change or reconfiguration.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Single-page slide requested by [`jump_to`](Self::jump_to) and not yet
    /// consumed.
    pub fn pending_animation(&self) -> Option<PageDirection> {
        self.pending_animation
    }

    /// Consumes the pending slide request.
    pub fn take_pending_animation(&mut self) -> Option<PageDirection> {
        self.pending_animation.take()
    }

    /// The current day according to the configured clock.
    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// `false` iff `date` lies outside the configured bounds.
    pub fn can_move_to(&self, date: NaiveDate) -> bool {
        self.config.contains(date)
    }

    /// Whether a step of `delta` periods would be committed.
    pub fn can_step(&self, delta: i32) -> bool {
        self.target_anchor(delta).is_some()
    }

    /// Inclusive first and last day of the displayed period.
    pub fn displayed_period(&self) -> (NaiveDate, NaiveDate) {
        let end = period_end(self.displayed_date, self.config.display_mode)
            .unwrap_or(self.displayed_date);
        (self.displayed_date, end)
    }

    /// Advances the displayed period by `delta` months or weeks.
    ///
    /// Returns `false` without touching any state when `delta` is zero, the
    /// arithmetic overflows, or the target period lies outside the bounds.
    ///
    /// A period is inside the bounds when any of its days is, not only its
    /// anchor: with `min_date` on the 20th, that month stays reachable even
    /// though its first day is not.
    pub fn step_period(&mut self, delta: i32) -> bool {
        self.commit_period(delta, SelectionPolicy::Auto)
    }

    /// [`step_period`](Self::step_period) with an explicit selection policy.
    pub fn step_period_with(&mut self, delta: i32, policy: SelectionPolicy) -> bool {
        self.commit_period(delta, policy)
    }

    /// Validates a prospective step and notifies `page_will_change`.
    ///
    /// Returns the anchor the step would land on.
    pub fn will_step(&self, delta: i32) -> Option<NaiveDate> {
        let target = self.target_anchor(delta)?;
        self.notify(|delegate| delegate.page_will_change(target));
        Some(target)
    }

    /// Shows the period containing `date`.
    ///
    /// An animated move of exactly one period is only recorded as a pending
    /// slide; everything else commits immediately. The selection is never
    /// changed.
    pub fn jump_to(&mut self, date: NaiveDate, animated: bool) -> JumpOutcome {
        if !self.can_move_to(date) {
            return JumpOutcome::Rejected;
        }
        let target = self.anchor_of(date);
        let delta = period_delta(self.displayed_date, target, self.config.display_mode);
        let Ok(delta) = i32::try_from(delta) else {
            return JumpOutcome::Rejected;
        };
        match PageDirection::from_delta(i64::from(delta)) {
            None => JumpOutcome::AlreadyVisible,
            Some(direction) if animated && delta.abs() == 1 => {
                if !self.can_step(delta) {
                    return JumpOutcome::Rejected;
                }
                self.pending_animation = Some(direction);
                JumpOutcome::Animate(direction)
            }
            Some(_) => {
                if self.will_step(delta).is_none() {
                    return JumpOutcome::Rejected;
                }
                if self.commit_period(delta, SelectionPolicy::Preserve) {
                    JumpOutcome::Committed
                } else {
                    JumpOutcome::Rejected
                }
            }
        }
    }

    /// Selects `date`, clamped into bounds, and brings it into view.
    ///
    /// Returns `false` and fires nothing when the clamped date is already
    /// selected.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        let date = self.config.clamp(date);
        if self.selected_date == Some(date) {
            return false;
        }
        self.selected_date = Some(date);
        let delta = period_delta(
            self.displayed_date,
            self.anchor_of(date),
            self.config.display_mode,
        );
        let committed = i32::try_from(delta).is_ok_and(|delta| {
            delta != 0
                && self.will_step(delta).is_some()
                && self.commit_period(delta, SelectionPolicy::Preserve)
        });
        if !committed {
            self.regenerate();
        }
        self.notify(|delegate| delegate.date_selected(date));
        true
    }

    /// Moves the selection by `days` (from today when nothing is selected).
    ///
    /// Crossing into another period delegates to [`jump_to`](Self::jump_to).
    pub fn step_day(&mut self, days: i64, animated: bool) -> bool {
        let base = self.selected_date.unwrap_or_else(|| self.today());
        let Some(target) = shift_days(base, days) else {
            debug!(%base, days, "day step overflowed");
            return false;
        };
        if !self.can_move_to(target) || self.selected_date == Some(target) {
            return false;
        }
        self.selected_date = Some(target);
        if self.anchor_of(target) == self.displayed_date
            || self.jump_to(target, animated) != JumpOutcome::Committed
        {
            self.regenerate();
        }
        self.notify(|delegate| delegate.date_selected(target));
        true
    }

    /// Applies a new configuration.
    ///
    /// The selection is clamped into the new bounds and the pages are
    /// regenerated around the selection when it is on screen. Changes that
    /// leave the layout, the displayed period and the selection alone keep
    /// the current pages and revision.
    pub fn set_config(&mut self, config: CalendarConfig) -> Result<(), CalendarError> {
        config.validate()?;
        let (first, last) = self.displayed_period();
        let focus = self
            .selected_date
            .filter(|date| (first..=last).contains(date))
            .unwrap_or(self.displayed_date);
        let relayout = self.config.affects_layout(&config);
        let previous_selection = self.selected_date;
        self.config = config;
        self.selected_date = self.selected_date.map(|date| self.config.clamp(date));
        let anchor = self.anchor_of(self.config.clamp(focus));
        let moved = anchor != self.displayed_date;
        if !relayout && !moved && self.selected_date == previous_selection {
            debug!("calendar reconfigured, pages unchanged");
            return Ok(());
        }
        self.displayed_date = anchor;
        self.pending_animation = None;
        self.revision += 1;
        self.regenerate();
        debug!(relayout, %anchor, "calendar reconfigured");
        if moved {
            self.notify(|delegate| delegate.page_did_change(anchor));
        }
        Ok(())
    }

    /// Height of the page at `index` for fixed height styles.
    pub fn page_height(&self, index: usize) -> Option<f32> {
        let row_height = self.config.height_style.row_height()?;
        let page = self.window.pages().get(index)?;
        Some(match self.config.display_mode {
            DisplayMode::Month => page.week_count() as f32 * row_height,
            DisplayMode::Week => row_height,
        })
    }

    /// Height of the current page for fixed height styles.
    pub fn current_height(&self) -> Option<f32> {
        self.page_height(self.window.current_index())
    }

    /// Week-of-year label for the row starting at `date`.
    pub fn week_number(&self, date: NaiveDate) -> u32 {
        week_of_year(date)
    }

    /// Events touching `week`, pulled from the data source.
    ///
    /// Uses the range query first and falls back to per-day queries,
    /// de-duplicating events reported on several days.
    pub fn events_for_week(&self, week: &CalendarWeek) -> Vec<CalendarEvent> {
        let Some(source) = self.data_source() else {
            return Vec::new();
        };
        let first = week[0].date();
        let last = week[DAYS_PER_WEEK - 1].date();
        let events = source.events_in_range(first, last);
        if !events.is_empty() {
            return events;
        }
        let mut merged: Vec<CalendarEvent> = Vec::new();
        for day in week {
            for event in source.events_for_date(day.date()) {
                let duplicate = merged.iter().any(|known| match (&known.id, &event.id) {
                    (Some(a), Some(b)) => a == b,
                    _ => *known == event,
                });
                if !duplicate {
                    merged.push(event);
                }
            }
        }
        merged
    }

    /// Number of events on `date`, for dot and count display styles.
    pub fn event_count(&self, date: NaiveDate) -> usize {
        let Some(source) = self.data_source() else {
            return 0;
        };
        match source.events_for_date(date).len() {
            0 => source.events_in_range(date, date).len(),
            count => count,
        }
    }

    fn data_source(&self) -> Option<Arc<dyn CalendarDataSource>> {
        self.data_source.as_ref().and_then(Weak::upgrade)
    }

    fn notify(&self, f: impl FnOnce(&dyn CalendarDelegate)) {
        if let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) {
            f(&*delegate);
        }
    }

    fn anchor_of(&self, date: NaiveDate) -> NaiveDate {
        period_anchor(date, self.config.display_mode, self.config.start_week_day).unwrap_or_else(
            || {
                warn!(%date, "cannot compute period anchor, using the date itself");
                date
            },
        )
    }

    fn period_is_reachable(&self, anchor: NaiveDate) -> bool {
        period_end(anchor, self.config.display_mode)
            .is_some_and(|end| self.config.overlaps(anchor, end))
    }

    fn target_anchor(&self, delta: i32) -> Option<NaiveDate> {
        if delta == 0 {
            return None;
        }
        shift_period(self.displayed_date, delta, self.config.display_mode)
            .filter(|anchor| self.period_is_reachable(*anchor))
    }

    fn auto_selection(&self, anchor: NaiveDate) -> NaiveDate {
        let today = self.today();
        let end = period_end(anchor, self.config.display_mode).unwrap_or(anchor);
        let pick = if (anchor..=end).contains(&today) {
            today
        } else {
            anchor
        };
        self.config.clamp(pick)
    }

    fn commit_period(&mut self, delta: i32, policy: SelectionPolicy) -> bool {
        let Some(target) = self.target_anchor(delta) else {
            debug!(
                delta,
                displayed = %self.displayed_date,
                "page step rejected"
            );
            return false;
        };
        self.displayed_date = target;
        if policy == SelectionPolicy::Auto && self.config.auto_select {
            self.selected_date = Some(self.auto_selection(target));
        }
        self.pending_animation = None;
        self.revision += 1;
        self.regenerate();
        debug!(delta, anchor = %target, "page committed");
        self.notify(|delegate| delegate.page_did_change(target));
        true
    }

    fn regenerate(&mut self) {
        let today = self.today();
        let offsets: &[i32] = if self.config.is_paging_enabled {
            &[-1, 0, 1]
        } else {
            &[0]
        };
        let mut pages = SmallVec::new();
        for &offset in offsets {
            let anchor = if offset == 0 {
                self.displayed_date
            } else {
                shift_period(self.displayed_date, offset, self.config.display_mode)
                    .unwrap_or_else(|| {
                        warn!(
                            offset,
                            displayed = %self.displayed_date,
                            "neighbour page out of range, repeating current page"
                        );
                        self.displayed_date
                    })
            };
            let page = self.generate_page(anchor, today);
            if page.is_degraded() {
                self.notify(|delegate| delegate.date_arithmetic_degraded(anchor));
            }
            pages.push(page);
        }
        self.window = NavigationWindow { pages };
    }

    fn generate_page(&self, anchor: NaiveDate, today: NaiveDate) -> CalendarPage {
        match self.config.display_mode {
            DisplayMode::Month => generate_month_page(
                anchor,
                self.config.start_week_day,
                self.config.month_style,
                self.selected_date,
                today,
            ),
            DisplayMode::Week => generate_week_page(
                anchor,
                self.config.start_week_day,
                self.selected_date,
                today,
            ),
        }
    }
}
