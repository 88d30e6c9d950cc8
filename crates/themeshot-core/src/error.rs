use crate::driver::DriverError;
use crate::theme::Theme;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifies the runner step in which a failure happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Authenticate,
    RotateCredentials,
    OpenSettings,
    ApplyTheme(Theme),
    Capture(String),
    Preview(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Authenticate => f.write_str("authenticate"),
            Step::RotateCredentials => f.write_str("rotate-credentials"),
            Step::OpenSettings => f.write_str("open-settings"),
            Step::ApplyTheme(theme) => write!(f, "apply-theme({})", theme),
            Step::Capture(name) => write!(f, "capture({})", name),
            Step::Preview(name) => write!(f, "preview({})", name),
        }
    }
}

/// Failure of a verification run
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("[{step}] authentication failed: {detail}")]
    AuthenticationFailed { step: Step, detail: String },

    #[error("[{step}] timed out after {}ms waiting for {target}", .timeout.as_millis())]
    NavigationTimeout {
        step: Step,
        target: String,
        timeout: Duration,
    },

    #[error("[{step}] expected {expected} within {}ms", .timeout.as_millis())]
    AssertionFailed {
        step: Step,
        expected: String,
        timeout: Duration,
    },

    #[error("[{step}] unexpected state: {detail}")]
    UnexpectedState { step: Step, detail: String },
}

impl VerifyError {
    /// Wrap a driver failure with the step it interrupted
    pub fn driver(step: Step, err: DriverError) -> Self {
        VerifyError::UnexpectedState {
            step,
            detail: err.to_string(),
        }
    }

    pub fn step(&self) -> &Step {
        match self {
            VerifyError::AuthenticationFailed { step, .. }
            | VerifyError::NavigationTimeout { step, .. }
            | VerifyError::AssertionFailed { step, .. }
            | VerifyError::UnexpectedState { step, .. } => step,
        }
    }

    /// Stable name of the error kind, used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::AuthenticationFailed { .. } => "authentication_failed",
            VerifyError::NavigationTimeout { .. } => "navigation_timeout",
            VerifyError::AssertionFailed { .. } => "assertion_failed",
            VerifyError::UnexpectedState { .. } => "unexpected_state",
        }
    }
}

/// Rejected run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
