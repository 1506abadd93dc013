//! Unified error hierarchy for liftrs
//!
//! Every public engine operation validates its inputs at the boundary and
//! returns a [`LiftRsError`] instead of silently correcting bad state.

use thiserror::Error;

/// Top-level error type for all liftrs operations
#[derive(Debug, Error)]
pub enum LiftRsError {
    /// Landmark ordering invariant `MV <= MEV <= MAV <= MRV` violated
    #[error("Invalid volume landmarks for {muscle}: {reason}")]
    InvalidLandmarks { muscle: String, reason: String },

    /// Muscle group lookup miss
    #[error("Unknown muscle group: {0}")]
    UnknownMuscleGroup(String),

    /// Input outside its documented range where the policy is to reject
    #[error("Input out of range: {field}={value} (expected {expected})")]
    OutOfRangeInput {
        field: String,
        value: String,
        expected: String,
    },

    /// Engine state validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// State (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for liftrs operations
pub type Result<T> = std::result::Result<T, LiftRsError>;

impl LiftRsError {
    /// Shorthand for an [`LiftRsError::InvalidLandmarks`] error
    pub fn invalid_landmarks(muscle: impl Into<String>, reason: impl Into<String>) -> Self {
        LiftRsError::InvalidLandmarks {
            muscle: muscle.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Engine operations are deterministic, so only IO failures in the
    /// caller's persistence layer are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LiftRsError::Io(_))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftRsError::UnknownMuscleGroup(_) => ErrorSeverity::Warning,
            LiftRsError::OutOfRangeInput { .. } => ErrorSeverity::Warning,
            LiftRsError::Validation(_) => ErrorSeverity::Warning,
            LiftRsError::InvalidLandmarks { .. } => ErrorSeverity::Error,
            LiftRsError::Configuration(_) => ErrorSeverity::Error,
            LiftRsError::Serialization(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftRsError::InvalidLandmarks { muscle, .. } => {
                format!(
                    "Volume landmarks for {} must satisfy MV <= MEV <= MAV <= MRV. Please recalibrate them.",
                    muscle
                )
            }
            LiftRsError::UnknownMuscleGroup(muscle) => {
                format!("No volume landmarks are configured for '{}'.", muscle)
            }
            LiftRsError::Serialization(_) => {
                "Saved training state could not be read. It may be corrupted.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error requiring immediate attention
    Critical,
    /// Error that prevents the operation but the caller can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
