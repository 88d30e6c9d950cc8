pub mod artifact;
pub mod config;
pub mod driver;
pub mod error;
pub mod report;
pub mod runner;
pub mod theme;
pub mod wait;

pub use artifact::{Artifact, ArtifactKind, ArtifactWriter};
pub use config::{Labels, PagePreview, Routes, RunConfig, ThemeControl, Timeouts};
pub use driver::{Driver, DriverError, DriverResult};
pub use error::{ConfigError, Result, Step, VerifyError};
pub use report::{FailureSummary, RunReport};
pub use runner::VerificationRunner;
pub use theme::Theme;
pub use wait::{Backoff, Poller, WaitPolicy};
