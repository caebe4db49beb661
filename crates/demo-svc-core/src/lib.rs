//! demo-svc core: error surface and environment helpers shared by the server
//! and its tooling.
//!
//! This crate carries no HTTP or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `DemoSvcError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod env;
pub mod error;

/// Shared result type.
pub use error::{DemoSvcError, Result};
