//! Turns drags and programmatic page triggers into committed page steps.
//!
//! One animation cycle is in flight at a time. Triggers arriving while a
//! cycle is in flight are folded into a signed step counter and push the
//! settle deadline back; when the deadline passes, [`PagingCoordinator::tick`]
//! applies the net step exactly once. Opposite triggers cancel out.
//!
//! The coordinator has no timer of its own: the host calls `tick` from its
//! frame loop with the current [`Instant`], the same way the pager controller
//! advances its snapping animation.
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use derive_setters::Setters;
use tracing::debug;

use crate::navigation::{JumpOutcome, NavigationState, PageDirection, SelectionPolicy};

/// Drag distance, in logical units, that commits a page change on release.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 50.0;
/// Time after the last accepted trigger before the net step is committed.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Tunables for [`PagingCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Setters)]
pub struct PagingConfig {
    /// Minimum drag magnitude that commits a page change.
    pub drag_threshold: f32,
    /// Delay between the last trigger and the commit.
    pub settle_delay: Duration,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// The user is dragging the pages.
    Dragging,
    /// A drag was released below the threshold and is sliding back.
    SpringBack,
    /// A drag was released past the threshold and is sliding to a neighbour.
    Committing,
    /// A programmatic trigger is sliding to a neighbour.
    AnimatingExternal,
}

impl PagingPhase {
    /// Whether a page slide is waiting for its settle deadline.
    pub fn is_sliding(self) -> bool {
        matches!(self, PagingPhase::Committing | PagingPhase::AnimatingExternal)
    }
}

/// What happened when a cycle settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingSettle {
    /// The net step was applied.
    Committed {
        /// Net periods moved.
        delta: i32,
        /// New displayed anchor.
        anchor: NaiveDate,
    },
    /// Opposite triggers cancelled each other out.
    Cancelled,
    /// The navigation state refused the net step.
    Blocked {
        /// Net periods that were refused.
        delta: i32,
    },
    /// The displayed page changed by other means during the cycle; the
    /// coalesced steps were dropped.
    Discarded,
    /// A short drag slid back into place.
    SpringBack,
}

/// Coalescing front end for page navigation.
#[derive(Debug, Clone, Default)]
pub struct PagingCoordinator {
    config: PagingConfig,
    phase: PagingPhase,
    drag_offset: f32,
    pending_steps: i32,
    deadline: Option<Instant>,
    cycle_revision: u64,
    selection_policy: SelectionPolicy,
    slide_direction: Option<PageDirection>,
}

impl PagingCoordinator {
    /// Creates an idle coordinator.
    pub fn new(config: PagingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current tunables.
    pub fn config(&self) -> PagingConfig {
        self.config
    }

    /// Current phase.
    pub fn phase(&self) -> PagingPhase {
        self.phase
    }

    /// Net steps waiting for the settle deadline.
    pub fn pending_steps(&self) -> i32 {
        self.pending_steps
    }

    /// When the in-flight cycle settles.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether anything is scheduled.
    pub fn is_in_flight(&self) -> bool {
        self.deadline.is_some()
    }

    /// Offset the host should render the page strip at, given the size of a
    /// page along the scroll axis. Positive offsets reveal the previous page.
    pub fn target_offset(&self, page_size: f32) -> f32 {
        match self.phase {
            PagingPhase::Dragging => self.drag_offset,
            PagingPhase::Idle | PagingPhase::SpringBack => 0.0,
            PagingPhase::Committing | PagingPhase::AnimatingExternal => {
                match self.slide_direction {
                    Some(PageDirection::Previous) => page_size,
                    Some(PageDirection::Next) => -page_size,
                    None => 0.0,
                }
            }
        }
    }

    /// Starts tracking a drag. Only allowed while idle.
    pub fn begin_drag(&mut self) -> bool {
        if self.phase != PagingPhase::Idle {
            return false;
        }
        self.phase = PagingPhase::Dragging;
        self.drag_offset = 0.0;
        true
    }

    /// Records the current drag displacement.
    pub fn update_drag(&mut self, displacement: f32) {
        if self.phase == PagingPhase::Dragging {
            self.drag_offset = displacement;
        }
    }

    /// Finishes a drag. Returns the direction of the slide when the
    /// displacement passed the threshold and the step is reachable; otherwise
    /// the pages spring back.
    pub fn end_drag(
        &mut self,
        displacement: f32,
        nav: &NavigationState,
        now: Instant,
    ) -> Option<PageDirection> {
        if self.phase != PagingPhase::Dragging {
            return None;
        }
        self.drag_offset = 0.0;
        self.phase = PagingPhase::Idle;
        if let Some(direction) = self.direction_for(displacement)
            && self.enqueue(direction, nav, now, SelectionPolicy::Auto, PagingPhase::Committing)
        {
            return Some(direction);
        }
        self.phase = PagingPhase::SpringBack;
        self.deadline = Some(now + self.config.settle_delay);
        None
    }

    /// Reports a released swipe in one go, for gestures that land while a
    /// slide is already in flight. Coalesced like [`trigger`](Self::trigger).
    pub fn fling(&mut self, displacement: f32, nav: &NavigationState, now: Instant) -> bool {
        if self.phase == PagingPhase::Dragging {
            return false;
        }
        match self.direction_for(displacement) {
            Some(direction) => {
                self.enqueue(direction, nav, now, SelectionPolicy::Auto, PagingPhase::Committing)
            }
            None => false,
        }
    }

    /// Requests a one-page slide, e.g. from a header button.
    ///
    /// Returns `false` when the slide is refused: during a drag, or when the
    /// accumulated target lies outside the navigation bounds.
    pub fn trigger(
        &mut self,
        direction: PageDirection,
        nav: &NavigationState,
        now: Instant,
    ) -> bool {
        if self.phase == PagingPhase::Dragging {
            return false;
        }
        self.enqueue(
            direction,
            nav,
            now,
            SelectionPolicy::Auto,
            PagingPhase::AnimatingExternal,
        )
    }

    /// Consumes a slide requested by [`NavigationState::jump_to`] and starts
    /// animating it. The selection is preserved when it commits.
    pub fn drive_pending_animation(&mut self, nav: &mut NavigationState, now: Instant) -> bool {
        let Some(direction) = nav.take_pending_animation() else {
            return false;
        };
        if self.phase == PagingPhase::Dragging {
            debug!(?direction, "dropping slide request during drag");
            return false;
        }
        self.enqueue(
            direction,
            nav,
            now,
            SelectionPolicy::Preserve,
            PagingPhase::AnimatingExternal,
        )
    }

    /// Settles the in-flight cycle once its deadline has passed.
    pub fn tick(&mut self, nav: &mut NavigationState, now: Instant) -> Option<PagingSettle> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        let phase = self.phase;
        let steps = self.pending_steps;
        let policy = self.selection_policy;
        self.reset();
        match phase {
            PagingPhase::SpringBack => Some(PagingSettle::SpringBack),
            PagingPhase::Committing | PagingPhase::AnimatingExternal => {
                let settle = if nav.revision() != self.cycle_revision {
                    debug!(steps, "page changed during slide, dropping coalesced steps");
                    PagingSettle::Discarded
                } else if steps == 0 {
                    PagingSettle::Cancelled
                } else if nav.step_period_with(steps, policy) {
                    PagingSettle::Committed {
                        delta: steps,
                        anchor: nav.displayed_date(),
                    }
                } else {
                    PagingSettle::Blocked { delta: steps }
                };
                debug!(?settle, "paging cycle settled");
                Some(settle)
            }
            PagingPhase::Idle | PagingPhase::Dragging => None,
        }
    }

    /// Drops everything in flight without committing.
    pub fn cancel(&mut self) {
        if self.pending_steps != 0 {
            debug!(steps = self.pending_steps, "cancelling coalesced page steps");
        }
        self.reset();
    }

    /// Cancels the in-flight cycle, then steps immediately.
    pub fn step_period(&mut self, nav: &mut NavigationState, delta: i32) -> bool {
        self.cancel();
        nav.step_period(delta)
    }

    /// Cancels the in-flight cycle, then jumps. A single-page animated jump
    /// starts a new slide.
    pub fn jump_to(
        &mut self,
        nav: &mut NavigationState,
        date: NaiveDate,
        animated: bool,
        now: Instant,
    ) -> JumpOutcome {
        self.cancel();
        let outcome = nav.jump_to(date, animated);
        if let JumpOutcome::Animate(_) = outcome {
            self.drive_pending_animation(nav, now);
        }
        outcome
    }

    fn direction_for(&self, displacement: f32) -> Option<PageDirection> {
        if displacement > self.config.drag_threshold {
            Some(PageDirection::Previous)
        } else if displacement < -self.config.drag_threshold {
            Some(PageDirection::Next)
        } else {
            None
        }
    }

    fn enqueue(
        &mut self,
        direction: PageDirection,
        nav: &NavigationState,
        now: Instant,
        policy: SelectionPolicy,
        idle_phase: PagingPhase,
    ) -> bool {
        // The page moved under an in-flight slide: the steps gathered so far
        // are relative to a page that is gone, so the cycle restarts here.
        let stale = self.phase.is_sliding() && nav.revision() != self.cycle_revision;
        let base = if stale { 0 } else { self.pending_steps };
        let net = base + direction.delta();
        if net != 0 && !nav.can_step(net) {
            debug!(net, "page trigger out of bounds");
            return false;
        }
        if stale {
            debug!(
                dropped = self.pending_steps,
                "page changed during slide, restarting coalesced steps"
            );
            self.cycle_revision = nav.revision();
            self.selection_policy = policy;
        } else if self.phase.is_sliding() {
            if policy == SelectionPolicy::Preserve {
                self.selection_policy = policy;
            }
        } else {
            self.phase = idle_phase;
            self.cycle_revision = nav.revision();
            self.selection_policy = policy;
        }
        self.pending_steps = net;
        self.slide_direction = Some(direction);
        self.deadline = Some(now + self.config.settle_delay);
        if net != 0 {
            nav.will_step(net);
        }
        true
    }

    fn reset(&mut self) {
        self.phase = PagingPhase::Idle;
        self.drag_offset = 0.0;
        self.pending_steps = 0;
        self.deadline = None;
        self.selection_policy = SelectionPolicy::Auto;
        self.slide_direction = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use parking_lot::Mutex;

    use super::*;
    use crate::{config::CalendarConfig, delegate::CalendarDelegate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[derive(Default)]
    struct Counter {
        did_change: AtomicUsize,
    }

    impl CalendarDelegate for Counter {
        fn page_did_change(&self, _anchor: NaiveDate) {
            self.did_change.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn nav_with(config: CalendarConfig) -> (NavigationState, Arc<Counter>) {
        let counter = Arc::new(Counter::default());
        let nav = NavigationState::new(config, date(2025, 1, 15), None)
            .unwrap()
            .with_today(|| NaiveDate::from_ymd_opt(2025, 1, 20).unwrap())
            .with_delegate(&counter);
        (nav, counter)
    }

    #[test]
    fn rapid_triggers_commit_their_net_step_once() {
        let (mut nav, counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        assert!(paging.trigger(PageDirection::Next, &nav, t0));
        assert_eq!(paging.phase(), PagingPhase::AnimatingExternal);
        assert!(paging.trigger(PageDirection::Next, &nav, t0 + ms(100)));
        assert!(paging.trigger(PageDirection::Previous, &nav, t0 + ms(200)));
        assert_eq!(paging.pending_steps(), 1);

        // The deadline moved with the last trigger.
        assert_eq!(paging.tick(&mut nav, t0 + ms(400)), None);
        assert_eq!(
            paging.tick(&mut nav, t0 + ms(500)),
            Some(PagingSettle::Committed {
                delta: 1,
                anchor: date(2025, 2, 1),
            })
        );
        assert_eq!(paging.tick(&mut nav, t0 + ms(1000)), None);
        assert_eq!(nav.displayed_date(), date(2025, 2, 1));
        assert_eq!(counter.did_change.load(Ordering::SeqCst), 1);
        assert_eq!(paging.phase(), PagingPhase::Idle);
        assert_eq!(paging.pending_steps(), 0);
    }

    #[test]
    fn opposite_triggers_cancel_out() {
        let (mut nav, counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        paging.trigger(PageDirection::Next, &nav, t0);
        paging.trigger(PageDirection::Previous, &nav, t0 + ms(50));
        assert_eq!(
            paging.tick(&mut nav, t0 + ms(350)),
            Some(PagingSettle::Cancelled)
        );
        assert_eq!(nav.displayed_date(), date(2025, 1, 1));
        assert_eq!(nav.revision(), 0);
        assert_eq!(counter.did_change.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn short_drag_springs_back() {
        let (mut nav, _counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        assert!(paging.begin_drag());
        paging.update_drag(30.0);
        assert_eq!(paging.target_offset(320.0), 30.0);
        assert_eq!(paging.end_drag(30.0, &nav, t0), None);
        assert_eq!(paging.phase(), PagingPhase::SpringBack);
        assert_eq!(paging.target_offset(320.0), 0.0);
        assert!(!paging.begin_drag());
        assert_eq!(
            paging.tick(&mut nav, t0 + DEFAULT_SETTLE_DELAY),
            Some(PagingSettle::SpringBack)
        );
        assert_eq!(nav.displayed_date(), date(2025, 1, 1));
        assert!(paging.begin_drag());
    }

    #[test]
    fn long_drag_towards_positive_offset_pages_back() {
        let (mut nav, _counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        paging.begin_drag();
        assert_eq!(
            paging.end_drag(80.0, &nav, t0),
            Some(PageDirection::Previous)
        );
        assert_eq!(paging.phase(), PagingPhase::Committing);
        assert_eq!(paging.target_offset(320.0), 320.0);
        // A second swipe landing mid-slide is coalesced, not a new drag.
        assert!(!paging.begin_drag());
        assert!(paging.fling(120.0, &nav, t0 + ms(100)));
        assert!(!paging.fling(10.0, &nav, t0 + ms(150)));
        assert_eq!(
            paging.tick(&mut nav, t0 + ms(400)),
            Some(PagingSettle::Committed {
                delta: -2,
                anchor: date(2024, 11, 1),
            })
        );
        // Swipe commits auto-select the period anchor.
        assert_eq!(nav.selected_date(), Some(date(2024, 11, 1)));
    }

    #[test]
    fn triggers_past_the_bounds_are_refused() {
        let config = CalendarConfig::default()
            .min_date(date(2025, 1, 1))
            .max_date(date(2025, 2, 28));
        let (mut nav, _counter) = nav_with(config);
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        assert!(paging.trigger(PageDirection::Next, &nav, t0));
        assert!(!paging.trigger(PageDirection::Next, &nav, t0 + ms(10)));
        assert_eq!(paging.pending_steps(), 1);
        assert!(!PagingCoordinator::default().trigger(PageDirection::Previous, &nav, t0));
        paging.tick(&mut nav, t0 + ms(310));
        assert_eq!(nav.displayed_date(), date(2025, 2, 1));
    }

    #[test]
    fn manual_navigation_discards_stale_steps() {
        let (mut nav, _counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        paging.trigger(PageDirection::Next, &nav, t0);
        assert!(nav.step_period(3));
        assert_eq!(
            paging.tick(&mut nav, t0 + ms(300)),
            Some(PagingSettle::Discarded)
        );
        assert_eq!(nav.displayed_date(), date(2025, 4, 1));
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PageCall {
        Will(NaiveDate),
        Did(NaiveDate),
    }

    #[derive(Default)]
    struct PageLog {
        calls: Mutex<Vec<PageCall>>,
    }

    impl CalendarDelegate for PageLog {
        fn page_will_change(&self, anchor: NaiveDate) {
            self.calls.lock().push(PageCall::Will(anchor));
        }

        fn page_did_change(&self, anchor: NaiveDate) {
            self.calls.lock().push(PageCall::Did(anchor));
        }
    }

    #[test]
    fn triggers_after_manual_navigation_start_a_fresh_cycle() {
        let log = Arc::new(PageLog::default());
        let mut nav = NavigationState::new(CalendarConfig::default(), date(2025, 1, 15), None)
            .unwrap()
            .with_today(|| NaiveDate::from_ymd_opt(2025, 1, 20).unwrap())
            .with_delegate(&log);
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        assert!(paging.trigger(PageDirection::Next, &nav, t0));
        assert!(nav.select_date(date(2025, 3, 10)));
        assert_eq!(nav.displayed_date(), date(2025, 3, 1));

        assert!(paging.trigger(PageDirection::Next, &nav, t0 + ms(100)));
        assert_eq!(paging.pending_steps(), 1);
        assert_eq!(
            paging.tick(&mut nav, t0 + ms(500)),
            Some(PagingSettle::Committed {
                delta: 1,
                anchor: date(2025, 4, 1),
            })
        );
        assert_eq!(nav.displayed_date(), date(2025, 4, 1));

        // The last announcement before each commit names the committed page.
        assert_eq!(
            *log.calls.lock(),
            vec![
                PageCall::Will(date(2025, 2, 1)),
                PageCall::Will(date(2025, 3, 1)),
                PageCall::Did(date(2025, 3, 1)),
                PageCall::Will(date(2025, 4, 1)),
                PageCall::Did(date(2025, 4, 1)),
            ]
        );
    }

    #[test]
    fn coordinator_navigation_cancels_pending_cycle() {
        let (mut nav, _counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        paging.trigger(PageDirection::Next, &nav, t0);
        paging.trigger(PageDirection::Next, &nav, t0);
        assert_eq!(
            paging.jump_to(&mut nav, date(2025, 6, 1), false, t0),
            JumpOutcome::Committed
        );
        assert!(!paging.is_in_flight());
        assert_eq!(paging.tick(&mut nav, t0 + ms(1000)), None);
        assert_eq!(nav.displayed_date(), date(2025, 6, 1));

        paging.trigger(PageDirection::Previous, &nav, t0);
        assert!(paging.step_period(&mut nav, 1));
        assert_eq!(paging.pending_steps(), 0);
        assert_eq!(nav.displayed_date(), date(2025, 7, 1));
    }

    #[test]
    fn animated_jump_slides_and_keeps_selection() {
        let (mut nav, _counter) = nav_with(CalendarConfig::default());
        let mut paging = PagingCoordinator::default();
        let t0 = Instant::now();
        nav.select_date(date(2025, 1, 31));
        assert!(nav.step_day(1, true));
        assert!(paging.drive_pending_animation(&mut nav, t0));
        assert_eq!(paging.phase(), PagingPhase::AnimatingExternal);
        assert_eq!(nav.displayed_date(), date(2025, 1, 1));
        paging.tick(&mut nav, t0 + ms(300));
        assert_eq!(nav.displayed_date(), date(2025, 2, 1));
        assert_eq!(nav.selected_date(), Some(date(2025, 2, 1)));

        let outcome = paging.jump_to(&mut nav, date(2025, 1, 15), true, t0);
        assert_eq!(outcome, JumpOutcome::Animate(PageDirection::Previous));
        assert!(paging.is_in_flight());
        assert_eq!(nav.pending_animation(), None);
        paging.tick(&mut nav, t0 + ms(300));
        assert_eq!(nav.displayed_date(), date(2025, 1, 1));
        assert_eq!(nav.selected_date(), Some(date(2025, 2, 1)));
    }

    #[test]
    fn custom_threshold_and_delay_apply() {
        let (mut nav, _counter) = nav_with(CalendarConfig::default());
        let config = PagingConfig::default()
            .drag_threshold(10.0)
            .settle_delay(ms(50));
        let mut paging = PagingCoordinator::new(config);
        let t0 = Instant::now();
        paging.begin_drag();
        assert_eq!(paging.end_drag(-20.0, &nav, t0), Some(PageDirection::Next));
        assert_eq!(paging.deadline(), Some(t0 + ms(50)));
        assert!(matches!(
            paging.tick(&mut nav, t0 + ms(50)),
            Some(PagingSettle::Committed { delta: 1, .. })
        ));
    }
}
