#![forbid(unsafe_code)]

//! First-run onboarding walkthrough.
//!
//! Unlike the guided tour this flow is fully manual: the user pages through
//! a few callouts anchored to dashboard panels. Whether it opens at all is
//! decided by a [`SeenFlag`] owned by the host.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TourError, TourResult};
use crate::seen_flag::SeenFlag;

/// Side of the target panel the callout is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Element id of the panel the callout points at.
    pub target: String,
    pub placement: Placement,
}

impl OnboardingStep {
    pub fn new(id: &str, title: &str, description: &str, target: &str, placement: Placement) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            target: target.to_string(),
            placement,
        }
    }
}

pub fn default_onboarding_steps() -> Vec<OnboardingStep> {
    vec![
        OnboardingStep::new(
            "output",
            "Real-Time Output",
            "Generated text appears here. Colors show whether a token was copied, newly \
             generated, or completes a pattern.",
            "output-panel",
            Placement::Left,
        ),
        OnboardingStep::new(
            "icl-highlight",
            "In-Context Learning in Action",
            "Highlighted spans are where the model copies and completes patterns it found \
             in the prompt.",
            "icl-text-container",
            Placement::Left,
        ),
        OnboardingStep::new(
            "timeline",
            "Induction Timeline",
            "Tracks how well the model follows the prompt's patterns. The induction score \
             peaks when a pattern is completed.",
            "visualization-panel",
            Placement::Left,
        ),
        OnboardingStep::new(
            "top-predictions",
            "Top Predictions",
            "The model's top candidates for the next token and how confident it was.",
            "top-predictions-container",
            Placement::Left,
        ),
        OnboardingStep::new(
            "icl-metrics",
            "ICL Metrics",
            "Detailed metrics such as how much the model copies versus creates new text.",
            "controls-panel",
            Placement::Right,
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct OnboardingWalkthrough {
    steps: Vec<OnboardingStep>,
    current: usize,
    visible: bool,
}

impl OnboardingWalkthrough {
    pub fn new(steps: Vec<OnboardingStep>) -> TourResult<Self> {
        if steps.is_empty() {
            return Err(TourError::EmptySteps);
        }
        Ok(Self {
            steps,
            current: 0,
            visible: false,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn step_index(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// The callout to draw, or `None` while hidden.
    pub fn current(&self) -> Option<&OnboardingStep> {
        self.visible.then(|| &self.steps[self.current])
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// "Step N of M".
    pub fn progress_label(&self) -> String {
        format!("Step {} of {}", self.current + 1, self.steps.len())
    }

    pub fn open(&mut self) {
        self.current = 0;
        self.visible = true;
    }

    /// Open the walkthrough unless the user has already seen it. A flag
    /// that cannot be read counts as a first run.
    pub fn open_if_first_run(&mut self, flag: &dyn SeenFlag) -> bool {
        let seen = flag.load().unwrap_or_else(|e| {
            warn!(backend = flag.name(), error = %e, "could not read onboarding flag");
            false
        });
        if !seen {
            self.open();
        }
        !seen
    }

    /// Move forward. Returns `false` on the last step.
    pub fn next(&mut self) -> bool {
        if !self.visible || self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.visible || self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Complete the walkthrough and remember it.
    pub fn finish(&mut self, flag: &dyn SeenFlag) -> TourResult<()> {
        debug!(step = self.current, "onboarding finished");
        self.dismiss(flag)
    }

    /// Dismiss early. The walkthrough still counts as seen.
    pub fn close(&mut self, flag: &dyn SeenFlag) -> TourResult<()> {
        debug!(step = self.current, "onboarding dismissed");
        self.dismiss(flag)
    }

    /// Forget that onboarding was seen so it opens again on next launch.
    pub fn reset(flag: &dyn SeenFlag) -> TourResult<()> {
        flag.store(false)
    }

    fn dismiss(&mut self, flag: &dyn SeenFlag) -> TourResult<()> {
        self.visible = false;
        self.current = 0;
        flag.store(true)
    }
}
