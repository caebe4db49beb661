//! Shared error type across demo-svc crates.

use thiserror::Error;

/// Stable error codes, used in logs and by callers matching on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Config file is malformed or fails validation.
    Config,
    /// A required environment variable is unset or empty.
    MissingEnv,
    /// An environment variable is set but cannot be used.
    InvalidEnv,
    /// Filesystem or socket failure.
    Io,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::MissingEnv => "MISSING_ENV",
            ErrorCode::InvalidEnv => "INVALID_ENV",
            ErrorCode::Io => "IO",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, DemoSvcError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum DemoSvcError {
    #[error("config: {0}")]
    Config(String),
    #[error("environment variable not set: {0}")]
    MissingEnv(String),
    #[error("invalid environment variable {key}: {reason}")]
    InvalidEnv { key: String, reason: String },
    #[error("io: {0}")]
    Io(String),
}

impl DemoSvcError {
    /// Map to a stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            DemoSvcError::Config(_) => ErrorCode::Config,
            DemoSvcError::MissingEnv(_) => ErrorCode::MissingEnv,
            DemoSvcError::InvalidEnv { .. } => ErrorCode::InvalidEnv,
            DemoSvcError::Io(_) => ErrorCode::Io,
        }
    }
}
