#![forbid(unsafe_code)]

//! Error types for the fallible edges of the tour: configuration files,
//! step catalogs, and the onboarding seen-flag store.
//!
//! Sequencing itself never fails. Out-of-range indices clamp and malformed
//! steps degrade to no-ops, so nothing in [`crate::sequencer`] returns a
//! [`TourError`] after construction.

use std::fmt;

/// Errors raised while loading or persisting tour data.
#[derive(Debug)]
pub enum TourError {
    /// I/O error while reading or writing a file.
    Io(std::io::Error),
    /// JSON encode/decode failure.
    Serialization(serde_json::Error),
    /// A step list with no steps.
    EmptySteps,
    /// Two steps share the same identifier.
    DuplicateStepId(String),
    /// A configuration value could not be interpreted.
    InvalidConfig(String),
    /// Stored state exists but is not in a format we understand.
    Corruption(String),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::Io(e) => write!(f, "I/O error: {e}"),
            TourError::Serialization(e) => write!(f, "serialization error: {e}"),
            TourError::EmptySteps => write!(f, "tour has no steps"),
            TourError::DuplicateStepId(id) => write!(f, "duplicate step id: {id}"),
            TourError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            TourError::Corruption(msg) => write!(f, "stored state corrupted: {msg}"),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::Io(e) => Some(e),
            TourError::Serialization(e) => Some(e),
            TourError::EmptySteps
            | TourError::DuplicateStepId(_)
            | TourError::InvalidConfig(_)
            | TourError::Corruption(_) => None,
        }
    }
}

impl From<std::io::Error> for TourError {
    fn from(e: std::io::Error) -> Self {
        TourError::Io(e)
    }
}

impl From<serde_json::Error> for TourError {
    fn from(e: serde_json::Error) -> Self {
        TourError::Serialization(e)
    }
}

/// Result type for tour loading and persistence.
pub type TourResult<T> = Result<T, TourError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_names_the_duplicate() {
        let err = TourError::DuplicateStepId("welcome".into());
        assert_eq!(err.to_string(), "duplicate step id: welcome");
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err: TourError = std::io::Error::other("disk gone").into();
        assert!(err.source().is_some());
        assert!(TourError::EmptySteps.source().is_none());
    }
}
