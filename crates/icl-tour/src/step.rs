#![forbid(unsafe_code)]

//! Tour step descriptors.
//!
//! A step pairs a message with an optional side effect. Steps are plain
//! data: they are built once (from [`crate::catalog`] or a JSON file) and
//! never mutated while a run is in progress.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Side effect performed when a step becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourAction {
    /// Ask the host to produce fresh sample data. Fires at most once per run.
    Generate,
    /// Switch the active visualization tab to the step's `tab_id`.
    Tab,
    /// Hold the current view while the backend works.
    Wait,
    /// Show the description only.
    #[serde(alias = "highlight")]
    Explain,
}

impl TourAction {
    pub fn label(self) -> &'static str {
        match self {
            TourAction::Generate => "generate",
            TourAction::Tab => "tab",
            TourAction::Wait => "wait",
            TourAction::Explain => "explain",
        }
    }
}

/// One unit of the guided walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub action: TourAction,
    /// Target tab for [`TourAction::Tab`]. Ignored for other actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    /// Time the step stays current before auto-advance, at 1x speed.
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    /// UI region emphasized while the step is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

impl TourStep {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        action: TourAction,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            action,
            tab_id: None,
            duration: Duration::from_millis(duration_ms),
            highlight: None,
        }
    }

    pub fn explain(id: &str, title: &str, description: &str, duration_ms: u64) -> Self {
        Self::new(id, title, description, TourAction::Explain, duration_ms)
    }

    pub fn wait(id: &str, title: &str, description: &str, duration_ms: u64) -> Self {
        Self::new(id, title, description, TourAction::Wait, duration_ms)
    }

    pub fn generate(id: &str, title: &str, description: &str, duration_ms: u64) -> Self {
        Self::new(id, title, description, TourAction::Generate, duration_ms)
    }

    pub fn tab(id: &str, title: &str, description: &str, tab_id: &str, duration_ms: u64) -> Self {
        Self::new(id, title, description, TourAction::Tab, duration_ms).with_tab(tab_id)
    }

    #[must_use]
    pub fn with_tab(mut self, tab_id: impl Into<String>) -> Self {
        self.tab_id = Some(tab_id.into());
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, selector: impl Into<String>) -> Self {
        self.highlight = Some(selector.into());
        self
    }

    /// A tab step without a target tab. Such steps run as no-ops.
    pub fn is_degraded(&self) -> bool {
        self.action == TourAction::Tab && self.tab_id.is_none()
    }
}

pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        s.serialize_u64(ms)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
