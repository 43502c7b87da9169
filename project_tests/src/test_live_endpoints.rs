//! # Live Endpoint Smoke Test
//!
//! Fetches every data category once from a running backend, using the same
//! configuration sources as the monitor (`.env`, `MONITOR_*`, CLI, config
//! file), and reports which endpoints answered. Exits non-zero when any failed.
//!
//! ```text
//! cargo run -p project_tests --bin test_live_endpoints -- --api-url http://localhost:8000
//! ```

#![forbid(unsafe_code)]

use std::time::Instant;

use anyhow::{bail, Result};
use lib_coldchain::configs::load_config;
use lib_coldchain::domain::Category;
use lib_coldchain::loggers::setup_logging;
use lib_coldchain::retrieve::ky_http::{describe_failure, ApiClient, ClientOptions};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _guard = setup_logging("test_live_endpoints", None, &config.log_level)?;

    let client = ApiClient::new(
        config.api_url.as_str(),
        ClientOptions {
            timeout: config.request_timeout,
            max_retries: config.max_retries,
            auth_token: config.auth_token.clone(),
            ..ClientOptions::default()
        },
    )?;

    let mut failed = 0usize;
    for category in Category::ALL {
        let path = category.endpoint();
        let started = Instant::now();
        match client.get_json::<Value>(path).await {
            Ok(body) => {
                let items = body.as_array().map_or(1, |a| a.len());
                info!(category = %category, path, items, elapsed_ms = started.elapsed().as_millis() as u64, "ok");
            }
            Err(e) => {
                failed += 1;
                error!(category = %category, "{}", describe_failure(path, &e));
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} endpoints failed", failed, Category::ALL.len());
    }
    info!("all {} endpoints answered", Category::ALL.len());
    Ok(())
}
