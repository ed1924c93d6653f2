//! Shared error type across rtstats crates.

use thiserror::Error;

/// Stable error codes for reports and exit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Config failed to parse or validate.
    InvalidConfig,
    /// Stats could not be encoded or decoded.
    Codec,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal failure (worker crashed, join failed).
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::Codec => "CODEC",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Unified error type used by core and collector.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("serde codec: {0}")]
    Codec(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl StatsError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StatsError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            StatsError::Codec(_) => ErrorCode::Codec,
            StatsError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            StatsError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(e: serde_json::Error) -> Self {
        StatsError::Codec(e.to_string())
    }
}
