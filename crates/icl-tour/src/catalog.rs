#![forbid(unsafe_code)]

//! Built-in step lists and JSON step loading.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{TourError, TourResult};
use crate::step::TourStep;

/// Region emphasized by tab steps of the built-in guide.
pub const VISUALIZATION_PANEL: &str = "#visualization-panel";

/// Visualization tabs of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualizationTab {
    InductionTimeline,
    AttentionHeatmap,
    AttentionGraph,
    InductionHeads,
    TokenImportance,
    StrategyTimeline,
}

impl VisualizationTab {
    pub const ALL: [VisualizationTab; 6] = [
        VisualizationTab::InductionTimeline,
        VisualizationTab::AttentionHeatmap,
        VisualizationTab::AttentionGraph,
        VisualizationTab::InductionHeads,
        VisualizationTab::TokenImportance,
        VisualizationTab::StrategyTimeline,
    ];

    pub fn id(self) -> &'static str {
        match self {
            VisualizationTab::InductionTimeline => "induction-timeline",
            VisualizationTab::AttentionHeatmap => "attention-heatmap",
            VisualizationTab::AttentionGraph => "attention-graph",
            VisualizationTab::InductionHeads => "induction",
            VisualizationTab::TokenImportance => "token-importance",
            VisualizationTab::StrategyTimeline => "strategy-timeline",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            VisualizationTab::InductionTimeline => "Induction Timeline",
            VisualizationTab::AttentionHeatmap => "Attention Heatmap",
            VisualizationTab::AttentionGraph => "Attention Graph",
            VisualizationTab::InductionHeads => "Induction Heads",
            VisualizationTab::TokenImportance => "Token Importance",
            VisualizationTab::StrategyTimeline => "Strategy Timeline",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }
}

fn tab_step(id: &str, title: &str, description: &str, tab: VisualizationTab) -> TourStep {
    TourStep::tab(id, title, description, tab.id(), 2000).with_highlight(VISUALIZATION_PANEL)
}

/// The automated ICL guide: generate a sample, then walk every
/// visualization tab with a follow-up explanation.
pub fn icl_guide() -> Vec<TourStep> {
    use VisualizationTab::*;

    vec![
        TourStep::explain(
            "welcome",
            "Welcome to the ICL Guide",
            "This walkthrough shows how the dashboard reveals the learning that happens \
             inside a model while it reads its own context. Sit back and watch each feature.",
            500,
        ),
        TourStep::generate(
            "generate-demo",
            "Step 1: Generating Text",
            "First we generate text from a Q&A prompt, a pattern that makes in-context \
             learning easy to see: Question, Answer, Question, Answer.",
            1000,
        ),
        TourStep::wait(
            "wait-generation",
            "Processing",
            "The model is generating and analysing its own attention in real time. The tour \
             keeps moving through the tabs while results stream in.",
            500,
        ),
        tab_step(
            "timeline-explanation",
            "Step 2: The Learning Timeline",
            "The blue line is the induction score. Spikes mark the moments the model \
             recognises the Q&A pattern; scores above 20 mean strong learning.",
            InductionTimeline,
        ),
        TourStep::explain(
            "timeline-peaks",
            "Learning Moments",
            "Coloured dots mark key moments: red for major breakthroughs, yellow for \
             sustained learning. Select a peak to inspect that generation step.",
            2000,
        ),
        tab_step(
            "attention-heatmap",
            "Step 3: The Attention Heatmap",
            "Each row is the token being generated and each column a token it can attend \
             to. Lighter cells are stronger attention.",
            AttentionHeatmap,
        ),
        TourStep::explain(
            "heatmap-patterns",
            "Reading the Patterns",
            "Diagonals are self-attention, vertical stripes are tokens everyone looks at, \
             and bright clusters are related tokens attending to each other.",
            2000,
        ),
        tab_step(
            "attention-graph",
            "Step 4: The Network View",
            "Tokens become nodes and attention becomes arrows; thicker arrows are stronger \
             connections and central nodes are important tokens.",
            AttentionGraph,
        ),
        TourStep::explain(
            "network-interaction",
            "Interactive Exploration",
            "Drag nodes, zoom, and hover connections for details. The threshold slider \
             filters out weak edges.",
            2000,
        ),
        tab_step(
            "induction-heads",
            "Step 5: Inside the Model",
            "Each bar is an attention head ranked by induction strength. More active bars \
             mean the pattern is recognised across the model.",
            InductionHeads,
        ),
        TourStep::explain(
            "brain-analysis",
            "Head Activity",
            "Purple bars are strong induction heads, blue moderate, gray inactive. \
             Different layers specialise in different patterns.",
            2000,
        ),
        tab_step(
            "token-importance",
            "Step 6: Token Importance",
            "Every token ranked by importance: hubs provide context, scanners gather it, \
             bridges connect concepts.",
            TokenImportance,
        ),
        tab_step(
            "strategy-timeline",
            "Step 7: Learning Strategies",
            "How the model balances induction, direct copying and previous-token \
             prediction over the course of generation.",
            StrategyTimeline,
        ),
        TourStep::explain(
            "conclusion",
            "Tour Complete",
            "Strong in-context learning shows up as timeline spikes, structured heatmaps, \
             active induction heads and clear token roles. Try your own prompts next.",
            2000,
        ),
        TourStep::tab(
            "back-to-timeline",
            "Ready to Explore",
            "Back to the timeline, the best starting point for analysis. The help panel \
             has detailed guides for every view.",
            InductionTimeline.id(),
            1000,
        ),
    ]
}

/// Parse a JSON array of steps and validate it.
pub fn parse_steps(json: &str) -> TourResult<Vec<TourStep>> {
    let steps: Vec<TourStep> = serde_json::from_str(json)?;
    validate_steps(&steps)?;
    Ok(steps)
}

pub fn load_steps(path: impl AsRef<Path>) -> TourResult<Vec<TourStep>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let steps = parse_steps(&text)?;
    debug!(path = %path.display(), steps = steps.len(), "loaded tour steps");
    Ok(steps)
}

/// Reject empty lists and duplicate ids. Tab steps without a target are
/// allowed through; they run as no-ops.
pub fn validate_steps(steps: &[TourStep]) -> TourResult<()> {
    if steps.is_empty() {
        return Err(TourError::EmptySteps);
    }
    let mut seen = HashSet::with_capacity(steps.len());
    for step in steps {
        if !seen.insert(step.id.as_str()) {
            return Err(TourError::DuplicateStepId(step.id.clone()));
        }
        if step.is_degraded() {
            warn!(step = %step.id, "tab step has no tab_id");
        } else if let Some(tab) = step.tab_id.as_deref()
            && VisualizationTab::from_id(tab).is_none()
        {
            debug!(step = %step.id, tab, "step targets a tab outside the built-in set");
        }
    }
    Ok(())
}
