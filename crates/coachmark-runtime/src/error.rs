#![forbid(unsafe_code)]

//! Sequencing errors.
//!
//! The state machine's public operations never fail loudly: a misconfigured
//! start or an out-of-phase call logs a warning and does nothing. These
//! values exist so that [`TutorialStateMachine::try_start`] can tell callers
//! *why* nothing happened, and so logs carry a stable label.
//!
//! [`TutorialStateMachine::try_start`]: crate::TutorialStateMachine::try_start

use std::fmt;

use crate::machine::Phase;

/// Why a sequencing request was not carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// `start` was called with no data source installed.
    NoDataSource,
    /// The data source reported zero steps.
    EmptySequence,
    /// `start` was called while a run is already active.
    AlreadyRunning { phase: Phase },
    /// An operation that needs a specific phase was called in another one.
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },
}

impl SequenceError {
    /// Stable label for logs and metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoDataSource => "no_data_source",
            Self::EmptySequence => "empty_sequence",
            Self::AlreadyRunning { .. } => "already_running",
            Self::InvalidPhase { .. } => "invalid_phase",
        }
    }

    /// Configuration errors abort `start`; the rest are ignorable.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::NoDataSource | Self::EmptySequence)
    }
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDataSource => write!(f, "no data source set; cannot start the tutorial"),
            Self::EmptySequence => write!(f, "data source reported no steps"),
            Self::AlreadyRunning { phase } => {
                write!(f, "tutorial already running (phase: {phase})")
            }
            Self::InvalidPhase { operation, phase } => {
                write!(f, "{operation} is not allowed in phase {phase}")
            }
        }
    }
}

impl std::error::Error for SequenceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_kind() {
        let err = SequenceError::InvalidPhase {
            operation: "resume",
            phase: Phase::Presenting,
        };
        assert_eq!(err.to_string(), "resume is not allowed in phase presenting");
        assert_eq!(err.kind(), "invalid_phase");
        assert!(!err.is_configuration_error());
        assert!(SequenceError::EmptySequence.is_configuration_error());
    }
}
