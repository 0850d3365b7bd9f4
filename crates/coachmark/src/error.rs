#![forbid(unsafe_code)]

//! coachmark error model.
//!
//! # Design Principles
//!
//! 1. **Nothing panics in a run.** The state machine logs and ignores calls it
//!    cannot honor; the typed errors below exist for callers that want to
//!    know why.
//! 2. **Domain-specific errors.** Each crate keeps its own error type; this
//!    module unifies them so `?` works across the facade.
//! 3. **Recovery is explicit.** Every variant maps to a [`Recovery`] telling
//!    the host what to do next.

use std::fmt;

use coachmark_core::GeometryError;
use coachmark_runtime::{ConfigError, SequenceError};

/// Top-level error type for coachmark hosts.
#[derive(Debug)]
pub enum Error {
    /// A sequencing request was not carried out.
    Sequence(SequenceError),
    /// A configuration file failed to load or validate.
    Config(ConfigError),
    /// A cutout region could not be built.
    Geometry(GeometryError),
    /// Raw I/O error.
    Io(std::io::Error),
}

/// Standard result type for coachmark APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What a host should do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Harmless; the call was a no-op.
    Ignore,
    /// The tutorial cannot start with the current data source.
    AbortStart,
    /// Run with the default configuration instead.
    UseDefaultConfig,
    /// Drop the offending step input (e.g. a malformed cutout).
    RejectInput,
}

impl Error {
    /// Recovery action for this error.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Sequence(err) if err.is_configuration_error() => Recovery::AbortStart,
            Self::Sequence(_) => Recovery::Ignore,
            Self::Config(_) | Self::Io(_) => Recovery::UseDefaultConfig,
            Self::Geometry(_) => Recovery::RejectInput,
        }
    }

    /// Error type label for logs and metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Config(_) => "config",
            Self::Geometry(_) => "geometry",
            Self::Io(_) => "io",
        }
    }

    /// Whether the tutorial can carry on (possibly degraded).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery(), Recovery::AbortStart)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(err) => write!(f, "sequence error: {err}"),
            Self::Config(err) => write!(f, "config error: {err}"),
            Self::Geometry(err) => write!(f, "geometry error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sequence(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Geometry(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<SequenceError> for Error {
    fn from(err: SequenceError) -> Self {
        Self::Sequence(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachmark_runtime::Phase;
    use std::error::Error as _;

    #[test]
    fn configuration_errors_abort_start() {
        let err: Error = SequenceError::EmptySequence.into();
        assert_eq!(err.recovery(), Recovery::AbortStart);
        assert!(!err.is_recoverable());
        assert_eq!(err.error_type(), "sequence");
    }

    #[test]
    fn phase_errors_are_ignorable() {
        let err: Error = SequenceError::AlreadyRunning {
            phase: Phase::Presenting,
        }
        .into();
        assert_eq!(err.recovery(), Recovery::Ignore);
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("presenting"));
    }

    #[test]
    fn config_errors_fall_back_to_defaults() {
        let err: Error = ConfigError::Validation(vec!["bad".into()]).into();
        assert_eq!(err.recovery(), Recovery::UseDefaultConfig);
        assert_eq!(err.error_type(), "config");
        assert!(err.source().is_some());
    }

    #[test]
    fn geometry_errors_reject_input() {
        let err: Error = GeometryError::DegeneratePolygon { vertices: 2 }.into();
        assert_eq!(err.recovery(), Recovery::RejectInput);
        assert_eq!(err.error_type(), "geometry");
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::other("gone").into();
        assert_eq!(err.error_type(), "io");
        assert!(err.to_string().contains("gone"));
    }
}
