//! Canned demo endpoints. Each logs one line and answers with a fixed status
//! and JSON body.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::app_state::AppState;

fn canned(state: &AppState, uri: &Uri, code: StatusCode, status: &str) -> impl IntoResponse {
    tracing::info!(path = %uri.path(), "received request");
    (code, Json(json!({ "status": status, "version": state.version() })))
}

pub async fn ok(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    canned(&state, &uri, StatusCode::OK, "ok")
}

pub async fn user_error(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    canned(&state, &uri, StatusCode::BAD_REQUEST, "Bad Request")
}

pub async fn server_error(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    canned(&state, &uri, StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
