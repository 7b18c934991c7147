#![forbid(unsafe_code)]

//! Read-only view model for the tour control panel.
//!
//! A [`TourSnapshot`] borrows from the sequencer and carries everything the
//! panel draws: the callout, progress, playback status, and a window of
//! step markers for the jump grid.

use std::time::Duration;

use crate::sequencer::{TourPhase, TourState};
use crate::step::{TourAction, TourStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourStatus {
    Running,
    Paused,
    Ready,
    Completed,
}

impl TourStatus {
    pub fn label(self) -> &'static str {
        match self {
            TourStatus::Running => "Tour Running",
            TourStatus::Paused => "Paused",
            TourStatus::Ready => "Ready",
            TourStatus::Completed => "Tour Complete",
        }
    }
}

impl From<TourPhase> for TourStatus {
    fn from(phase: TourPhase) -> Self {
        match phase {
            TourPhase::Playing => TourStatus::Running,
            TourPhase::Paused => TourStatus::Paused,
            TourPhase::Idle => TourStatus::Ready,
            TourPhase::Completed => TourStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Done,
    Current,
    Upcoming,
}

#[derive(Debug, Clone)]
pub struct TourSnapshotStep<'a> {
    pub index: usize,
    pub title: &'a str,
    pub action: TourAction,
    pub marker: StepMarker,
}

#[derive(Debug, Clone)]
pub struct TourSnapshot<'a> {
    pub step_index: usize,
    pub step_count: usize,
    /// `(step_index + 1) / step_count`, in `(0, 1]`.
    pub progress: f64,
    pub title: &'a str,
    pub description: &'a str,
    pub action: TourAction,
    pub status: TourStatus,
    pub speed: f64,
    /// Time before auto-advance; `None` when no advance is scheduled.
    pub remaining: Option<Duration>,
    pub highlight: Option<&'a str>,
    pub steps: Vec<TourSnapshotStep<'a>>,
}

impl<'a> TourSnapshot<'a> {
    pub(crate) fn build(
        steps: &'a [TourStep],
        state: &TourState,
        phase: TourPhase,
        remaining: Option<Duration>,
        highlight: Option<&'a str>,
        max_steps: usize,
    ) -> Self {
        let step_count = steps.len();
        let current = state.current_index.min(step_count.saturating_sub(1));
        let step = &steps[current];

        // Keep one finished step visible before the current one, and keep
        // the window full near the end of the list.
        let window = max_steps.max(1).min(step_count);
        let start = current
            .saturating_sub(1)
            .min(step_count.saturating_sub(window));
        let end = (start + window).min(step_count);
        let markers = steps[start..end]
            .iter()
            .enumerate()
            .map(|(offset, step)| {
                let index = start + offset;
                let marker = match index.cmp(&current) {
                    std::cmp::Ordering::Less => StepMarker::Done,
                    std::cmp::Ordering::Equal => StepMarker::Current,
                    std::cmp::Ordering::Greater => StepMarker::Upcoming,
                };
                TourSnapshotStep {
                    index,
                    title: &step.title,
                    action: step.action,
                    marker,
                }
            })
            .collect();

        Self {
            step_index: current,
            step_count,
            progress: (current + 1) as f64 / step_count as f64,
            title: &step.title,
            description: &step.description,
            action: step.action,
            status: phase.into(),
            speed: state.speed,
            remaining,
            highlight,
            steps: markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(n: usize) -> Vec<TourStep> {
        (0..n)
            .map(|i| TourStep::explain(&format!("s{i}"), &format!("Step {i}"), "body", 1000))
            .collect()
    }

    fn state_at(index: usize) -> TourState {
        TourState {
            current_index: index,
            ..TourState::default()
        }
    }

    #[test]
    fn window_keeps_one_done_step() {
        let steps = steps(15);
        let snap = TourSnapshot::build(&steps, &state_at(4), TourPhase::Playing, None, None, 5);
        let indices: Vec<usize> = snap.steps.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![3, 4, 5, 6, 7]);
        assert_eq!(snap.steps[0].marker, StepMarker::Done);
        assert_eq!(snap.steps[1].marker, StepMarker::Current);
        assert_eq!(snap.steps[4].marker, StepMarker::Upcoming);
        assert_eq!(snap.status.label(), "Tour Running");
    }

    #[test]
    fn window_stays_full_at_the_end() {
        let steps = steps(15);
        let snap = TourSnapshot::build(&steps, &state_at(14), TourPhase::Paused, None, None, 5);
        assert_eq!(snap.steps.len(), 5);
        assert_eq!(snap.steps.first().map(|s| s.index), Some(10));
        assert!((snap.progress - 1.0).abs() < f64::EPSILON);
        assert_eq!(snap.status, TourStatus::Paused);
    }

    #[test]
    fn tiny_window_and_short_list() {
        let steps = steps(2);
        let snap = TourSnapshot::build(&steps, &state_at(0), TourPhase::Idle, None, None, 0);
        assert_eq!(snap.steps.len(), 1);
        assert_eq!(snap.steps[0].marker, StepMarker::Current);
        assert!((snap.progress - 0.5).abs() < f64::EPSILON);

        let snap = TourSnapshot::build(&steps, &state_at(1), TourPhase::Idle, None, None, 40);
        assert_eq!(snap.steps.len(), 2);
        assert_eq!(snap.status, TourStatus::Ready);
    }
}
