//! # HTTP Retrieval Utilities
//!
//! An asynchronous API client wrapper around `reqwest` with `reqwest-middleware`
//! retry support, a hard per-request timeout and JSON decoding into typed
//! payloads.
//!
//! Two calling conventions are offered:
//!
//! - `request` / `get_json` return `Result<_, MonitorError>` with the failure
//!   classified (network, timeout, HTTP status, parse).
//! - `fetch_category` never fails: any error is logged and turned into `None`.
//!   This is what lets the poller treat each data category independently.

use std::time::Duration;

use reqwest::{header::HeaderMap, Method, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::MonitorError;

/// Default bound on a single request, connection to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A standardized container for API responses.
///
/// Wraps the deserialized data along with metadata about the HTTP transaction.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// Construction options for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Transient-failure retries; `0` disables retrying.
    pub max_retries: u32,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub auth_token: Option<String>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            auth_token: None,
            user_agent: concat!("coldchain-monitor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Asynchronous HTTP client bound to one backend.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// The base URL to which all relative paths are joined. Always ends in `/`.
    base_url: Url,
    auth_token: Option<String>,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:8000`).
    ///
    /// # Errors
    /// `MonitorError::Config` if the URL is not absolute or the TLS backend
    /// cannot be initialised.
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, MonitorError> {
        let mut url = Url::parse(base_url)
            .map_err(|e| MonitorError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(MonitorError::Config(format!("base URL '{}' cannot be a base", base_url)));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(|e| MonitorError::Config(format!("failed to build HTTP client: {}", e)))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(options.max_retries);
        let inner = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            inner,
            base_url: url,
            auth_token: options.auth_token,
            timeout: options.timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves an endpoint such as `/api/kpis` against the base URL, keeping any
    /// path prefix the base carries.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, MonitorError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| MonitorError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Performs a generic HTTP request.
    ///
    /// Non-2xx responses are not errors here: they come back with
    /// `success: false` and the raw body in `error_body`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        headers: Option<HeaderMap>,
        body: Option<B>,
    ) -> Result<ApiResponse<T>, MonitorError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.endpoint_url(path)?;
        self.bounded(path, self.exchange(method, url, path, headers, body)).await
    }

    async fn exchange<T, B>(
        &self,
        method: Method,
        url: Url,
        path: &str,
        headers: Option<HeaderMap>,
        body: Option<B>,
    ) -> Result<ApiResponse<T>, MonitorError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let mut req = self.inner.request(method, url);
        if let Some(h) = headers {
            req = req.headers(h);
        }
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            use reqwest::header::CONTENT_TYPE;
            let json_body = serde_json::to_string(&b)?;
            req = req.header(CONTENT_TYPE, "application/json").body(json_body);
        }

        let response = req.send().await.map_err(|e| self.classify(path, e))?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| self.classify_body(path, e))?;
            let data = decode::<T>(path, &bytes)?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            // Keep the error body for diagnostics.
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }

    /// GETs `path` and decodes a 2xx body into `T`.
    ///
    /// # Errors
    /// Every failure is classified: `Timeout`, `Network`, `HttpStatus`, `Parse`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, MonitorError> {
        let response = self.request::<T, ()>(Method::GET, path, None, None).await?;
        match response.data {
            Some(data) if response.success => Ok(data),
            _ => Err(MonitorError::HttpStatus {
                endpoint: path.to_string(),
                status: response.status,
                body: response.error_body,
            }),
        }
    }

    /// GETs one data category. Returns `None` on any failure after logging it;
    /// never returns an error to the caller.
    pub async fn fetch_category<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.get_json::<T>(path).await {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::error!(endpoint = path, timeout = err.is_timeout(), "{}", describe_failure(path, &err));
                None
            }
        }
    }

    async fn bounded<R>(
        &self,
        path: &str,
        exchange: impl std::future::Future<Output = Result<R, MonitorError>>,
    ) -> Result<R, MonitorError> {
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::Timeout {
                endpoint: path.to_string(),
                after: self.timeout,
            }),
        }
    }

    fn classify(&self, path: &str, err: reqwest_middleware::Error) -> MonitorError {
        match err {
            reqwest_middleware::Error::Reqwest(e) => self.classify_body(path, e),
            other => MonitorError::Network {
                endpoint: path.to_string(),
                message: other.to_string(),
            },
        }
    }

    fn classify_body(&self, path: &str, err: reqwest::Error) -> MonitorError {
        if err.is_timeout() {
            MonitorError::Timeout {
                endpoint: path.to_string(),
                after: self.timeout,
            }
        } else {
            MonitorError::Network {
                endpoint: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, MonitorError> {
    serde_json::from_slice(bytes).map_err(|e| MonitorError::Parse(format!("{}: {}", path, e)))
}

/// Appends `segment` to the endpoint `prefix` as one percent-encoded path
/// segment: `("/api/telemetry/history", "a b/c")` gives
/// `/api/telemetry/history/a%20b%2Fc`.
pub fn path_with_segment(prefix: &str, segment: &str) -> Result<String, MonitorError> {
    let mut url = Url::parse("http://localhost/").map_err(|e| MonitorError::Config(e.to_string()))?;
    url.set_path(prefix);
    url.path_segments_mut()
        .map_err(|_| MonitorError::Config(format!("invalid endpoint '{}'", prefix)))?
        .pop_if_empty()
        .push(segment);
    Ok(url.path().to_string())
}

/// The diagnostic line logged when a category fetch fails.
pub fn describe_failure(path: &str, err: &MonitorError) -> String {
    match err {
        MonitorError::Timeout { after, .. } => {
            format!("Request timeout for {} (aborted after {}ms)", path, after.as_millis())
        }
        other => format!("Error fetching from {}: {}", path, other),
    }
}
