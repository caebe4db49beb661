//! Axum router wiring.
//!
//! The `/v1/*` demo routes answer every method and are instrumented with their
//! route template as the metric label. Operational routes are not.

use axum::{
    routing::{any, get},
    Router,
};

use crate::obs::ObserveLayer;
use crate::{app_state::AppState, handlers, ops};

pub const ROUTE_OK: &str = "/v1/ok";
pub const ROUTE_USER_ERROR: &str = "/v1/user-error";
pub const ROUTE_SERVER_ERROR: &str = "/v1/server-error";

pub fn build_router(state: AppState) -> Router {
    let observe = |route: &'static str| ObserveLayer::new(state.metrics(), route);

    Router::new()
        .route(ROUTE_OK, any(handlers::ok).layer(observe(ROUTE_OK)))
        .route(
            ROUTE_USER_ERROR,
            any(handlers::user_error).layer(observe(ROUTE_USER_ERROR)),
        )
        .route(
            ROUTE_SERVER_ERROR,
            any(handlers::server_error).layer(observe(ROUTE_SERVER_ERROR)),
        )
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .with_state(state)
}
