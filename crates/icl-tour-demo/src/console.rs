#![forbid(unsafe_code)]

//! Console host and real-time playback loop.

use std::thread;
use std::time::Duration;

use icl_tour::onboarding::OnboardingWalkthrough;
use icl_tour::{StepMarker, TourEvent, TourHost, TourSequencer, TourSnapshot};
use tracing::{debug, info};
use web_time::Instant;

const BAR_WIDTH: usize = 20;

/// Host that prints every side effect to stdout.
#[derive(Debug, Default)]
pub struct ConsoleHost {
    pub active_tab: Option<String>,
    pub generate_requests: u32,
    pub closed: bool,
}

impl TourHost for ConsoleHost {
    fn generate(&mut self) {
        self.generate_requests += 1;
        println!("    > generation requested");
        info!(requests = self.generate_requests, "generate requested");
    }

    fn set_active_tab(&mut self, tab_id: &str) {
        println!("    > switched to tab '{tab_id}'");
        self.active_tab = Some(tab_id.to_string());
    }

    fn close(&mut self) {
        println!("    > tour closed");
        self.closed = true;
    }

    fn highlight(&mut self, selector: Option<&str>) {
        match selector {
            Some(sel) => println!("    > highlighting {sel}"),
            None => debug!("highlight cleared"),
        }
    }
}

pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Render the control-panel callout as plain text.
pub fn render_snapshot(snap: &TourSnapshot<'_>) -> String {
    let grid: String = snap
        .steps
        .iter()
        .map(|s| match s.marker {
            StepMarker::Done => 'x',
            StepMarker::Current => '>',
            StepMarker::Upcoming => '.',
        })
        .collect();
    format!(
        "[{:>2}/{}] [{}] {}\n    {}\n    {} | {}x | {}",
        snap.step_index + 1,
        snap.step_count,
        progress_bar(snap.progress),
        snap.title,
        snap.description,
        snap.status.label(),
        snap.speed,
        grid,
    )
}

pub fn print_onboarding(walkthrough: &mut OnboardingWalkthrough) {
    while let Some(step) = walkthrough.current() {
        println!(
            "{} - {} ({:?} of #{})\n    {}",
            walkthrough.progress_label(),
            step.title,
            step.placement,
            step.target,
            step.description
        );
        if !walkthrough.next() {
            break;
        }
    }
}

/// Play `tour` against the wall clock until it closes or `exit_after`
/// elapses.
pub fn run_tour(tour: &mut TourSequencer<ConsoleHost>, max_steps: usize, exit_after: Option<Duration>) {
    let started = Instant::now();
    tour.start();
    println!("{}", render_snapshot(&tour.snapshot(max_steps)));

    while let Some(wait) = tour.next_deadline() {
        let wait = match exit_after {
            Some(limit) => {
                let left = limit.saturating_sub(started.elapsed());
                if left.is_zero() {
                    info!("exit-after limit reached");
                    tour.stop();
                    break;
                }
                wait.min(left)
            }
            None => wait,
        };
        thread::sleep(wait);
        for event in tour.advance_to(started.elapsed()) {
            match event {
                TourEvent::StepChanged { .. } => {
                    println!("{}", render_snapshot(&tour.snapshot(max_steps)));
                }
                TourEvent::Completed { last_step } => {
                    info!(last_step, "tour complete");
                    println!("    {}", tour.snapshot(max_steps).status.label());
                }
                TourEvent::Closed { reason } => debug!(?reason, "tour closed"),
                TourEvent::Started { .. } | TourEvent::Paused { .. } | TourEvent::Resumed { .. } => {}
            }
        }
    }
}
