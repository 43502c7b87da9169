//! # Error Taxonomy
//!
//! Every failure the monitor can observe is classified into one of the variants
//! below. Category fetches never surface these to their callers (they are logged
//! and turned into `None`), but the fallible HTTP calls, the WebSocket channel and
//! the configuration loader report them directly.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the monitor library.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("network failure for {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// The request did not complete within the configured bound.
    #[error("request timeout for {endpoint} after {}ms", .after.as_millis())]
    Timeout { endpoint: String, after: Duration },

    /// The server answered with a non-2xx status.
    #[error("HTTP error for {endpoint}: status {status}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: Option<String>,
    },

    /// The payload did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(String),

    /// The real-time channel failed to connect or broke while open.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// A configuration value was missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    /// True for the variant the HTTP wrapper reports when it aborts a request.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MonitorError::Timeout { .. })
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_endpoint_and_bound() {
        let err = MonitorError::Timeout {
            endpoint: "/api/kpis".into(),
            after: Duration::from_secs(10),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "request timeout for /api/kpis after 10000ms");
    }

    #[test]
    fn serde_errors_become_parse_errors() {
        let err: MonitorError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert!(matches!(err, MonitorError::Parse(_)));
    }
}
