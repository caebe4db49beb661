//! Shared application state for demo-svc.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<HttpMetrics>,
}

struct AppStateInner {
    cfg: ServiceConfig,
}

impl AppState {
    /// Build application state. Metric aggregates are created here, once, and
    /// live until the process exits.
    pub fn new(cfg: ServiceConfig) -> Self {
        let metrics = Arc::new(HttpMetrics::new(cfg.metrics.namespace.clone()));
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            metrics,
        }
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    /// Version string echoed in every canned response.
    pub fn version(&self) -> &str {
        &self.inner.cfg.service.version
    }

    pub fn metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }
}
