//! Environment variable helpers.
//!
//! An empty value is treated the same as an unset one. A `.env` file, when
//! present, is loaded once at startup; variables already set in the host
//! environment win over the file.

use std::path::Path;

use crate::error::{DemoSvcError, Result};

/// Load `.env` from the working directory or one of its parents.
/// Returns whether a file was loaded.
pub fn load_dotenv() -> bool {
    report_dotenv(dotenv::dotenv().map(|_| ()))
}

/// Load a specific env file. Returns whether it was loaded.
pub fn load_dotenv_from(path: impl AsRef<Path>) -> bool {
    report_dotenv(dotenv::from_path(path.as_ref()))
}

fn report_dotenv(res: std::result::Result<(), dotenv::Error>) -> bool {
    match res {
        Ok(()) => true,
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("no .env file found, attempting to read variables from host environment");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load .env file, reading variables from host environment");
            false
        }
    }
}

/// Read `key`, returning `None` when it is unset, empty, or not valid unicode.
pub fn lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a variable the process cannot run without.
///
/// Returns `MissingEnv` instead of exiting; the caller owns the exit policy.
pub fn require(key: &str) -> Result<String> {
    lookup(key).ok_or_else(|| {
        tracing::error!(variable = key, "environment variable not set");
        DemoSvcError::MissingEnv(key.to_string())
    })
}

