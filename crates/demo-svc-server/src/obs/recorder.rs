//! Status capture for a response passing through the middleware.

use axum::http::{Response, StatusCode};

/// Remembers the last status code written for one response.
///
/// Starts at `200 OK`, matching a handler that never sets a status: an
/// `http::Response` built without one also carries 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRecorder {
    status: StatusCode,
}

impl Default for StatusRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRecorder {
    pub fn new() -> Self {
        Self { status: StatusCode::OK }
    }

    /// Record an explicit status write. Later writes replace earlier ones.
    pub fn write_header(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Record the status carried by a response head and hand the response back
    /// untouched.
    pub fn record<B>(&mut self, response: Response<B>) -> Response<B> {
        self.write_header(response.status());
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status as the decimal string used for the `status_code` label.
    pub fn status_label(&self) -> String {
        self.status.as_u16().to_string()
    }
}
