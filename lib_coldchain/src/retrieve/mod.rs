//! # Data Retrieval Module
//!
//! HTTP access to the telemetry backend. Everything that talks REST goes through
//! `ky_http::ApiClient`, which owns the base URL, the request timeout, the
//! optional bearer token and the optional retry middleware.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: the client itself, with a fallible API (`request`,
//!   `get_json`) and the never-failing `fetch_category` used by the poller.

/// HTTP client with a bounded wait time and uniform failure reporting.
pub mod ky_http;

#[cfg(test)]
pub(crate) mod test_support;

pub use ky_http::{ApiClient, ApiResponse, ClientOptions};
