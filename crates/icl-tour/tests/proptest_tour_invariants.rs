//! Property-based invariant tests for the tour sequencer.
//!
//! 1. `n` calls to `next()` from index `i` land on `min(i + n, len - 1)`.
//! 2. `jump_to` clamps any index into the step list.
//! 3. Generate reaches the host at most once per run, whatever the
//!    sequence of controls and elapsed time.
//! 4. The cursor stays in bounds under arbitrary control sequences.
//! 5. `stop()` always yields index 0, not playing, and exactly one close.

use std::time::Duration;

use icl_tour::{TourAction, TourHost, TourPhase, TourSequencer, TourStep};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct CountingHost {
    generated: usize,
    closed: usize,
}

impl TourHost for CountingHost {
    fn generate(&mut self) {
        self.generated += 1;
    }

    fn set_active_tab(&mut self, _tab_id: &str) {}

    fn close(&mut self) {
        self.closed += 1;
    }
}

#[derive(Debug, Clone)]
enum Control {
    Start,
    Pause,
    Resume,
    TogglePause,
    Stop,
    Next,
    Previous,
    Jump(usize),
    Execute(usize),
    Speed(f64),
    Advance(u64),
}

// ── Strategies ────────────────────────────────────────────────────────────

fn action_strategy() -> impl Strategy<Value = TourAction> {
    prop_oneof![
        Just(TourAction::Generate),
        Just(TourAction::Tab),
        Just(TourAction::Wait),
        Just(TourAction::Explain),
    ]
}

fn steps_strategy() -> impl Strategy<Value = Vec<TourStep>> {
    prop::collection::vec((action_strategy(), 0u64..=500, any::<bool>()), 1..12).prop_map(
        |shapes| {
            shapes
                .into_iter()
                .enumerate()
                .map(|(i, (action, duration_ms, has_tab))| {
                    let step = TourStep::new(format!("s{i}"), "title", "body", action, duration_ms);
                    if has_tab { step.with_tab("tab") } else { step }
                })
                .collect()
        },
    )
}

fn control_strategy() -> impl Strategy<Value = Control> {
    prop_oneof![
        Just(Control::Start),
        Just(Control::Pause),
        Just(Control::Resume),
        Just(Control::TogglePause),
        Just(Control::Stop),
        Just(Control::Next),
        Just(Control::Previous),
        (0usize..40).prop_map(Control::Jump),
        (0usize..40).prop_map(Control::Execute),
        prop_oneof![Just(0.5), Just(1.0), Just(1.5), Just(2.0)].prop_map(Control::Speed),
        (0u64..2_000).prop_map(Control::Advance),
    ]
}

fn tour(steps: Vec<TourStep>) -> TourSequencer<CountingHost> {
    TourSequencer::new(steps, CountingHost::default()).expect("non-empty steps")
}

proptest! {
    #[test]
    fn next_clamps_monotonically(steps in steps_strategy(), start in 0usize..12, n in 0usize..30) {
        let len = steps.len();
        let mut tour = tour(steps);
        tour.jump_to(start);
        let i = tour.current_index();
        for _ in 0..n {
            tour.next();
        }
        prop_assert_eq!(tour.current_index(), (i + n).min(len - 1));
    }

    #[test]
    fn jump_clamps(steps in steps_strategy(), index in any::<usize>()) {
        let len = steps.len();
        let mut tour = tour(steps);
        tour.start();
        tour.jump_to(index);
        prop_assert_eq!(tour.current_index(), index.min(len - 1));
    }

    #[test]
    fn generate_at_most_once_per_run(
        steps in steps_strategy(),
        controls in prop::collection::vec(control_strategy(), 0..60),
    ) {
        let mut tour = tour(steps);
        tour.start();
        let mut runs = 1;
        for control in controls {
            match control {
                Control::Start => {
                    tour.start();
                    runs += 1;
                }
                Control::Pause => { tour.pause(); }
                Control::Resume => { tour.resume(); }
                Control::TogglePause => { tour.toggle_pause(); }
                Control::Stop => { tour.stop(); }
                Control::Next => { tour.next(); }
                Control::Previous => { tour.previous(); }
                Control::Jump(i) => { tour.jump_to(i); }
                Control::Execute(i) => tour.execute_step(i),
                Control::Speed(s) => tour.set_speed(s),
                Control::Advance(ms) => { tour.advance(Duration::from_millis(ms)); }
            }
            prop_assert!(tour.current_index() < tour.step_count());
            prop_assert!(tour.host().generated <= runs);
            if tour.phase() == TourPhase::Paused {
                prop_assert_eq!(tour.remaining_in_step(), None);
            }
        }
    }

    #[test]
    fn stop_always_resets(
        steps in steps_strategy(),
        controls in prop::collection::vec(control_strategy(), 0..30),
    ) {
        let mut tour = tour(steps);
        for control in controls {
            match control {
                Control::Start => { tour.start(); }
                Control::Next => { tour.next(); }
                Control::Advance(ms) => { tour.advance(Duration::from_millis(ms)); }
                _ => {}
            }
        }
        let closed_before = tour.host().closed;
        tour.stop();
        prop_assert_eq!(tour.current_index(), 0);
        prop_assert!(!tour.state().is_playing);
        prop_assert_eq!(tour.phase(), TourPhase::Idle);
        prop_assert_eq!(tour.host().closed, closed_before + 1);
        tour.advance(Duration::from_secs(60));
        prop_assert_eq!(tour.host().closed, closed_before + 1);
    }
}
