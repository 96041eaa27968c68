// Typed errors with thiserror. These only surface at the JS boundary; the
// playback engine itself has no failure states (bad transitions are no-ops).

use thiserror::Error;

/// Boundary error types.
#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Unknown workout type: {0}")]
    UnknownWorkoutType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TimerError {
    fn from(err: serde_json::Error) -> Self {
        TimerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TimerError::UnknownWorkoutType("yoga".to_string());
        assert!(err.to_string().contains("yoga"));
    }
}
