#![forbid(unsafe_code)]

//! Guided tour and onboarding flow for the ICL telemetry dashboard.
//!
//! The crate has no opinion about rendering. A host implements
//! [`TourHost`] to receive side effects (generation requests, tab switches,
//! highlights, close notifications), drives time with
//! [`TourSequencer::advance`], and draws whatever [`TourSequencer::snapshot`]
//! describes.
//!
//! ```
//! use std::time::Duration;
//! use icl_tour::{TourHost, TourSequencer, catalog};
//!
//! #[derive(Default)]
//! struct Host { tab: Option<String> }
//!
//! impl TourHost for Host {
//!     fn generate(&mut self) {}
//!     fn set_active_tab(&mut self, tab_id: &str) { self.tab = Some(tab_id.into()); }
//!     fn close(&mut self) {}
//! }
//!
//! let mut tour = TourSequencer::new(catalog::icl_guide(), Host::default()).unwrap();
//! tour.start();
//! tour.advance(Duration::from_secs(3));
//! assert_eq!(tour.host().tab.as_deref(), Some("induction-timeline"));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod overlay;
pub mod scheduler;
pub mod seen_flag;
pub mod sequencer;
pub mod step;

pub use config::TourConfig;
pub use error::{TourError, TourResult};
pub use overlay::{StepMarker, TourSnapshot, TourStatus};
pub use sequencer::{
    CloseReason, TourAdvanceReason, TourEvent, TourHost, TourPhase, TourSequencer, TourState,
};
pub use step::{TourAction, TourStep};
