use chromiumoxide::error::CdpError;
use themeshot_core::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CdpError> for Error {
    fn from(err: CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

/// Map a protocol failure onto the runner's driver error
pub(crate) fn driver_error(err: CdpError) -> DriverError {
    match err {
        CdpError::Timeout => DriverError::Timeout("CDP request timed out".to_string()),
        other => DriverError::Protocol(other.to_string()),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
