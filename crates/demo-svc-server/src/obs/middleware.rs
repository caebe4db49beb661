//! Request instrumentation as a tower layer.
//!
//! `Observe` wraps one route's service. Per call it starts a timer, runs the
//! inner service, reads the response status through a [`StatusRecorder`] and
//! folds a [`RequestOutcome`] into the shared [`HttpMetrics`].
//!
//! The route label is supplied by the caller (usually the route template) so
//! dynamic path segments never become label values. It is not validated here.
//!
//! Nothing is recorded when the inner service returns `Err` or panics; the
//! failure travels on to the server unchanged.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::obs::metrics::{HttpMetrics, RequestOutcome};
use crate::obs::recorder::StatusRecorder;

/// Layer form of [`Observe`], for `MethodRouter::layer` / `Router::route_layer`.
#[derive(Clone)]
pub struct ObserveLayer {
    metrics: Arc<HttpMetrics>,
    route: Arc<str>,
}

impl ObserveLayer {
    pub fn new(metrics: Arc<HttpMetrics>, route: impl Into<Arc<str>>) -> Self {
        Self {
            metrics,
            route: route.into(),
        }
    }
}

impl<S> Layer<S> for ObserveLayer {
    type Service = Observe<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Observe {
            inner,
            metrics: Arc::clone(&self.metrics),
            route: Arc::clone(&self.route),
        }
    }
}

/// A service that records request count and latency for `inner`.
#[derive(Clone)]
pub struct Observe<S> {
    inner: S,
    metrics: Arc<HttpMetrics>,
    route: Arc<str>,
}

impl<S> Observe<S> {
    pub fn new(inner: S, metrics: Arc<HttpMetrics>, route: impl Into<Arc<str>>) -> Self {
        ObserveLayer::new(metrics, route).layer(inner)
    }

    pub fn route(&self) -> &str {
        &self.route
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for Observe<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let method = req.method().clone();
        let metrics = Arc::clone(&self.metrics);
        let route = Arc::clone(&self.route);

        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut recorder = StatusRecorder::new();
            let response = recorder.record(fut.await?);
            let status_code = recorder.status_label();

            metrics.observe(&RequestOutcome {
                method: &method,
                route: &route,
                status_code: &status_code,
                elapsed: start.elapsed(),
            });

            Ok(response)
        })
    }
}
