//! Request observability.
//!
//! Metrics are stored as atomics behind `DashMap` and rendered by the
//! `/metrics` handler.

pub mod metrics;
pub mod middleware;
pub mod recorder;

pub use metrics::HttpMetrics;
pub use middleware::{Observe, ObserveLayer};
pub use recorder::StatusRecorder;
