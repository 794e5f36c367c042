//! Error types.
//!
//! Configuration faults are reported before any model is built. Solver
//! outcomes (infeasible, timed out) are not errors; see
//! [`SolveStatus`](crate::search::SolveStatus).

use std::fmt;

/// Category of a configuration fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// End of day is not strictly after start of day.
    InvalidDayWindow,
    /// `num_days` or `num_rooms` is zero.
    NonPositiveCount,
    /// Exam duration is zero.
    NonPositiveDuration,
    /// A clock string is not `HH:MM`.
    InvalidClockTime,
    /// Time limit is not a positive, finite number of seconds.
    InvalidTimeLimit,
    /// Zero search workers requested.
    InvalidWorkerCount,
}

/// A configuration fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Failure of an optimization run before search starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Config(ConfigError),
    /// Two exam records share an identifier.
    DuplicateExamId(u32),
    /// An exam lists the same professor twice.
    IdenticalExaminers { exam_id: u32, professor: String },
    /// The worst-case objective does not fit below the declared cap.
    ObjectiveCapExceeded { worst_case: i64, cap: i64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => e.fmt(f),
            Error::DuplicateExamId(id) => write!(f, "duplicate exam id {id}"),
            Error::IdenticalExaminers { exam_id, professor } => {
                write!(f, "exam {exam_id} lists {professor} as both examiners")
            }
            Error::ObjectiveCapExceeded { worst_case, cap } => write!(
                f,
                "worst-case objective {worst_case} exceeds the objective cap {cap}; lower the weights"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}
