#![forbid(unsafe_code)]

//! Guided tour sequencing.
//!
//! [`TourSequencer`] walks an ordered list of [`TourStep`]s, performing each
//! step's action through a [`TourHost`] and advancing on a timer scaled by
//! the playback speed. Manual next/previous/jump controls move the cursor
//! without re-firing generation requests.
//!
//! # State machine
//!
//! ```text
//!            start()              pause()
//!   Idle ─────────────► Playing ◄──────────► Paused
//!    ▲                     │        resume()
//!    │ closing delay       │ last step timer
//!    └──────────────── Completed
//!
//!   stop() from any phase ──► Idle
//! ```
//!
//! # Invariants
//!
//! 1. `current_index < steps.len()` at all times; the step list is non-empty.
//! 2. `Generate` reaches the host at most once per run; only `start()` re-arms it.
//! 3. At most one advance timer is pending, and none while paused or idle.
//! 4. Timers from an earlier run never act on a later one: every timer carries
//!    the run epoch it was scheduled in, and `start()`/`stop()` bump the epoch.
//!
//! Time is virtual. The owner calls [`TourSequencer::advance`] with elapsed
//! time (a fixed delta in tests, measured wall time in a real host).

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::config::TourConfig;
use crate::error::{TourError, TourResult};
use crate::overlay::TourSnapshot;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::step::{TourAction, TourStep};

pub const SPEED_MIN: f64 = 0.25;
pub const SPEED_MAX: f64 = 4.0;
pub const DEFAULT_CLOSING_DELAY: Duration = Duration::from_millis(2000);

/// Side effects a tour needs from the surrounding application.
///
/// The sequencer calls these and moves on; it never waits for a result.
pub trait TourHost {
    /// Request fresh sample data from the backend.
    fn generate(&mut self);

    /// Switch the active visualization.
    fn set_active_tab(&mut self, tab_id: &str);

    /// The tour ended, either naturally or because the user stopped it.
    fn close(&mut self);

    /// Emphasize a UI region, or clear the emphasis with `None`.
    fn highlight(&mut self, _selector: Option<&str>) {}
}

impl<H: TourHost + ?Sized> TourHost for &mut H {
    fn generate(&mut self) {
        (**self).generate();
    }

    fn set_active_tab(&mut self, tab_id: &str) {
        (**self).set_active_tab(tab_id);
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn highlight(&mut self, selector: Option<&str>) {
        (**self).highlight(selector);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourPhase {
    Idle,
    Playing,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourAdvanceReason {
    Auto,
    ManualNext,
    ManualPrev,
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The closing delay after the last step elapsed.
    Finished,
    /// `stop()` or an implicit stop from hiding the tour.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    Started {
        step: usize,
    },
    StepChanged {
        from: usize,
        to: usize,
        reason: TourAdvanceReason,
    },
    Paused {
        step: usize,
    },
    Resumed {
        step: usize,
    },
    Completed {
        last_step: usize,
    },
    Closed {
        reason: CloseReason,
    },
}

/// Mutable playback state for one tour invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TourState {
    pub current_index: usize,
    pub is_playing: bool,
    pub is_paused: bool,
    pub speed: f64,
    pub has_triggered_generate: bool,
}

impl Default for TourState {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            is_paused: false,
            speed: 1.0,
            has_triggered_generate: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Advance,
    ClearHighlight,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct TourTimer {
    kind: TimerKind,
    epoch: u64,
}

/// Whether a step is entered by the timer or by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Auto,
    Manual,
}

#[derive(Debug)]
pub struct TourSequencer<H: TourHost> {
    steps: Vec<TourStep>,
    host: H,
    state: TourState,
    visible: bool,
    closing_delay: Duration,
    highlight: Option<String>,
    scheduler: Scheduler<TourTimer>,
    epoch: u64,
    advance_timer: Option<TimerHandle>,
    highlight_timer: Option<TimerHandle>,
    close_timer: Option<TimerHandle>,
}

impl<H: TourHost> TourSequencer<H> {
    /// Build a sequencer over `steps`. The tour starts visible and idle.
    pub fn new(steps: Vec<TourStep>, host: H) -> TourResult<Self> {
        if steps.is_empty() {
            return Err(TourError::EmptySteps);
        }
        for step in steps.iter().filter(|s| s.is_degraded()) {
            warn!(step = %step.id, "tab step has no tab_id; it will run as a no-op");
        }
        Ok(Self {
            steps,
            host,
            state: TourState::default(),
            visible: true,
            closing_delay: DEFAULT_CLOSING_DELAY,
            highlight: None,
            scheduler: Scheduler::new(),
            epoch: 0,
            advance_timer: None,
            highlight_timer: None,
            close_timer: None,
        })
    }

    pub fn with_config(steps: Vec<TourStep>, host: H, config: &TourConfig) -> TourResult<Self> {
        let mut tour = Self::new(steps, host)?;
        tour.state.speed = normalize_speed(config.speed);
        tour.closing_delay = config.closing_delay;
        Ok(tour)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TourState {
        &self.state
    }

    pub fn phase(&self) -> TourPhase {
        if self.state.is_playing {
            if self.state.is_paused {
                TourPhase::Paused
            } else {
                TourPhase::Playing
            }
        } else if self.close_timer.is_some() {
            TourPhase::Completed
        } else {
            TourPhase::Idle
        }
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_step(&self) -> &TourStep {
        &self.steps[self.state.current_index]
    }

    pub fn steps(&self) -> &[TourStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn closing_delay(&self) -> Duration {
        self.closing_delay
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Region currently emphasized, if any.
    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Virtual time since the sequencer was created.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Time until the next pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Time left before the current step auto-advances.
    pub fn remaining_in_step(&self) -> Option<Duration> {
        self.advance_timer
            .and_then(|handle| self.scheduler.remaining(handle))
    }

    pub fn snapshot(&self, max_steps: usize) -> TourSnapshot<'_> {
        TourSnapshot::build(
            &self.steps,
            &self.state,
            self.phase(),
            self.remaining_in_step(),
            self.highlight(),
            max_steps,
        )
    }

    // ── Controls ───────────────────────────────────────────────────────

    pub fn set_speed(&mut self, speed: f64) {
        self.state.speed = normalize_speed(speed);
        debug!(speed = self.state.speed, "tour speed changed");
    }

    pub fn set_closing_delay(&mut self, delay: Duration) {
        self.closing_delay = delay;
    }

    /// Show or hide the tour. Hiding an active or completed tour stops it.
    pub fn set_visible(&mut self, visible: bool) -> Vec<TourEvent> {
        if self.visible == visible {
            return Vec::new();
        }
        let events = if !visible && self.phase() != TourPhase::Idle {
            self.stop()
        } else {
            Vec::new()
        };
        self.visible = visible;
        events
    }

    /// Begin a fresh run from step 0.
    pub fn start(&mut self) -> Vec<TourEvent> {
        if !self.visible {
            return Vec::new();
        }
        self.reset_run();
        self.state.has_triggered_generate = false;
        self.state.is_playing = true;
        info!(steps = self.steps.len(), speed = self.state.speed, "tour started");
        self.enter_step(Entry::Auto);
        self.schedule_advance();
        vec![TourEvent::Started { step: 0 }]
    }

    pub fn pause(&mut self) -> Vec<TourEvent> {
        if !self.state.is_playing || self.state.is_paused {
            return Vec::new();
        }
        self.state.is_paused = true;
        self.cancel_advance();
        debug!(step = self.state.current_index, "tour paused");
        vec![TourEvent::Paused {
            step: self.state.current_index,
        }]
    }

    /// Resume playback. The current step gets its full duration again.
    pub fn resume(&mut self) -> Vec<TourEvent> {
        if !self.state.is_playing || !self.state.is_paused {
            return Vec::new();
        }
        self.state.is_paused = false;
        self.schedule_advance();
        debug!(step = self.state.current_index, "tour resumed");
        vec![TourEvent::Resumed {
            step: self.state.current_index,
        }]
    }

    pub fn toggle_pause(&mut self) -> Vec<TourEvent> {
        if self.state.is_paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// End the tour from any phase and notify the host exactly once.
    pub fn stop(&mut self) -> Vec<TourEvent> {
        self.reset_run();
        info!("tour stopped");
        self.host.close();
        vec![TourEvent::Closed {
            reason: CloseReason::Stopped,
        }]
    }

    /// Drop every pending timer without calling the host.
    pub fn teardown(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.advance_timer = None;
        self.highlight_timer = None;
        self.close_timer = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.state.is_playing = false;
        self.state.is_paused = false;
        trace!(dropped, "tour torn down");
    }

    pub fn next(&mut self) -> Option<TourEvent> {
        let target = (self.state.current_index + 1).min(self.last_index());
        self.move_to(target, TourAdvanceReason::ManualNext)
    }

    pub fn previous(&mut self) -> Option<TourEvent> {
        let target = self.state.current_index.saturating_sub(1);
        self.move_to(target, TourAdvanceReason::ManualPrev)
    }

    /// Jump to `index`, clamped into the step list.
    pub fn jump_to(&mut self, index: usize) -> Option<TourEvent> {
        let target = index.min(self.last_index());
        self.move_to(target, TourAdvanceReason::Jump)
    }

    /// Perform the action of the step at `index` (clamped).
    ///
    /// `Generate` is guarded: only the first call in a run reaches the host.
    pub fn execute_step(&mut self, index: usize) {
        let index = index.min(self.last_index());
        self.run_action(index, Entry::Auto);
    }

    // ── Time ───────────────────────────────────────────────────────────

    /// Advance virtual time by `delta`, firing every timer that comes due.
    pub fn advance(&mut self, delta: Duration) -> Vec<TourEvent> {
        let target = self.scheduler.now().saturating_add(delta);
        self.advance_to(target)
    }

    /// Advance virtual time to `now`. Earlier values are ignored.
    pub fn advance_to(&mut self, now: Duration) -> Vec<TourEvent> {
        let mut events = Vec::new();
        while let Some(fired) = self.scheduler.pop_due(now) {
            let timer = fired.payload;
            if timer.epoch != self.epoch {
                trace!(kind = ?timer.kind, "dropping timer from an earlier run");
                continue;
            }
            match timer.kind {
                TimerKind::Advance if self.advance_timer == Some(fired.handle) => {
                    self.advance_timer = None;
                    events.extend(self.on_advance());
                }
                TimerKind::ClearHighlight if self.highlight_timer == Some(fired.handle) => {
                    self.highlight_timer = None;
                    self.clear_highlight();
                }
                TimerKind::Close if self.close_timer == Some(fired.handle) => {
                    self.close_timer = None;
                    events.push(self.on_close());
                }
                kind => trace!(?kind, "ignoring superseded timer"),
            }
        }
        self.scheduler.settle(now);
        events
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    fn reset_run(&mut self) {
        self.scheduler.cancel_all();
        self.advance_timer = None;
        self.highlight_timer = None;
        self.close_timer = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.clear_highlight();
        self.state.current_index = 0;
        self.state.is_playing = false;
        self.state.is_paused = false;
    }

    fn move_to(&mut self, target: usize, reason: TourAdvanceReason) -> Option<TourEvent> {
        if !self.visible || target == self.state.current_index {
            return None;
        }
        let from = self.state.current_index;
        self.state.current_index = target;
        if self.state.is_playing {
            self.enter_step(Entry::Manual);
            if !self.state.is_paused {
                self.schedule_advance();
            }
        }
        debug!(from, to = target, ?reason, "tour step changed");
        Some(TourEvent::StepChanged {
            from,
            to: target,
            reason,
        })
    }

    fn on_advance(&mut self) -> Option<TourEvent> {
        if !self.state.is_playing || self.state.is_paused {
            return None;
        }
        let from = self.state.current_index;
        if from == self.last_index() {
            self.state.is_playing = false;
            self.state.is_paused = false;
            let timer = TourTimer {
                kind: TimerKind::Close,
                epoch: self.epoch,
            };
            self.close_timer = Some(self.scheduler.schedule(timer, self.closing_delay));
            info!(last_step = from, "tour completed");
            return Some(TourEvent::Completed { last_step: from });
        }
        self.state.current_index = from + 1;
        self.enter_step(Entry::Auto);
        self.schedule_advance();
        Some(TourEvent::StepChanged {
            from,
            to: from + 1,
            reason: TourAdvanceReason::Auto,
        })
    }

    fn on_close(&mut self) -> TourEvent {
        self.reset_run();
        info!("tour closed after completion");
        self.host.close();
        TourEvent::Closed {
            reason: CloseReason::Finished,
        }
    }

    fn enter_step(&mut self, entry: Entry) {
        self.run_action(self.state.current_index, entry);
    }

    fn run_action(&mut self, index: usize, entry: Entry) {
        let step = &self.steps[index];
        debug!(
            step = %step.id,
            action = step.action.label(),
            manual = entry == Entry::Manual,
            "executing tour step"
        );
        let highlight = step.highlight.clone().map(|sel| (sel, step.duration));

        match step.action {
            TourAction::Generate => {
                if entry == Entry::Manual {
                    trace!(step = %step.id, "manual navigation skips generate");
                } else if !self.state.has_triggered_generate {
                    self.state.has_triggered_generate = true;
                    self.host.generate();
                }
            }
            TourAction::Tab => match step.tab_id.as_deref() {
                Some(tab) => self.host.set_active_tab(tab),
                None => warn!(step = %step.id, "tab step without tab_id skipped"),
            },
            TourAction::Wait | TourAction::Explain => {}
        }

        if let Some((selector, duration)) = highlight {
            self.set_highlight(selector, duration);
        }
    }

    fn set_highlight(&mut self, selector: String, duration: Duration) {
        if let Some(handle) = self.highlight_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.host.highlight(Some(&selector));
        self.highlight = Some(selector);
        let timer = TourTimer {
            kind: TimerKind::ClearHighlight,
            epoch: self.epoch,
        };
        self.highlight_timer = Some(self.scheduler.schedule(timer, duration));
    }

    fn clear_highlight(&mut self) {
        if self.highlight.take().is_some() {
            self.host.highlight(None);
        }
    }

    fn schedule_advance(&mut self) {
        self.cancel_advance();
        let after = scale_duration(self.current_step().duration, self.state.speed);
        let timer = TourTimer {
            kind: TimerKind::Advance,
            epoch: self.epoch,
        };
        self.advance_timer = Some(self.scheduler.schedule(timer, after));
    }

    fn cancel_advance(&mut self) {
        if let Some(handle) = self.advance_timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

/// Clamp a requested speed into the supported range. Non-finite or
/// non-positive values fall back to 1x.
pub fn normalize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed.clamp(SPEED_MIN, SPEED_MAX)
    } else {
        1.0
    }
}

/// Wall-clock time a step of `duration` takes at `speed`.
pub fn scale_duration(duration: Duration, speed: f64) -> Duration {
    let micros = duration.as_micros() as f64 / speed;
    let micros = micros.round().clamp(0.0, u64::MAX as f64) as u64;
    Duration::from_micros(micros)
}
