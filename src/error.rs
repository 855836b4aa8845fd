//! Error types for learning rate scheduling.

use thiserror::Error;

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "Unknown scheduler '{0}'. Scheduler must be cosine, cosine_with_restarts, \
         decaying_cosine_with_restarts, step, linear, constant or constant_with_warmup"
    )]
    UnknownScheduler(String),

    #[error("Unexpected option '{option}' for scheduler '{scheduler}'")]
    UnexpectedOption { scheduler: &'static str, option: &'static str },

    #[error("Missing required option '{option}' for scheduler '{scheduler}'")]
    MissingOption { scheduler: &'static str, option: &'static str },

    #[error("Scheduler state mismatch: {0}")]
    StateMismatch(String),

    #[error("Invalid scheduler configuration: {0}")]
    Config(String),
}

impl SchedulerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_error_display() {
        let err =
            SchedulerError::InvalidArgument("Expected positive integer T_0, but got 0".into());
        assert!(format!("{}", err).contains("Invalid argument"));
        assert!(format!("{}", err).contains("T_0"));

        let err = SchedulerError::UnknownScheduler("onecycle".into());
        assert!(format!("{}", err).contains("onecycle"));
        assert!(format!("{}", err).contains("decaying_cosine_with_restarts"));

        let err = SchedulerError::UnexpectedOption { scheduler: "step", option: "T_0" };
        assert!(format!("{}", err).contains("'T_0'"));
        assert!(format!("{}", err).contains("'step'"));

        let err = SchedulerError::MissingOption { scheduler: "cosine", option: "T_max" };
        assert!(format!("{}", err).contains("Missing required option"));

        let err = SchedulerError::StateMismatch("t_cur out of range".into());
        assert!(format!("{}", err).contains("t_cur"));

        let err = SchedulerError::Config("bad yaml".into());
        assert!(format!("{}", err).contains("bad yaml"));
    }
}
