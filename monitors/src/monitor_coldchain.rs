use std::sync::Arc;

use anyhow::{Context, Result};
use lib_coldchain::configs::load_config;
use lib_coldchain::core::Dispatcher;
use lib_coldchain::domain::Profile;
use lib_coldchain::ingestors::{DeliveryLoader, TelemetryPoller, TelemetryWssIngestor, WssConfig};
use lib_coldchain::loggers::setup_logging;
use lib_coldchain::retrieve::ky_http::{ApiClient, ClientOptions};
use lib_coldchain::{AppStore, DashboardState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod coldchain_logic;
use coldchain_logic::{input, render};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = setup_logging("monitor_coldchain", config.log_dir.as_deref(), &config.log_level)?;
    info!(
        api = %config.api_url,
        profile = ?config.profile,
        categories = config.categories.len(),
        interval_ms = config.poll_interval.as_millis() as u64,
        "monitor starting"
    );

    let store = AppStore::new(DashboardState::new(config.history_window));
    let client = Arc::new(
        ApiClient::new(
            config.api_url.as_str(),
            ClientOptions {
                timeout: config.request_timeout,
                max_retries: config.max_retries,
                auth_token: config.auth_token.clone(),
                ..ClientOptions::default()
            },
        )
        .context("cannot build the API client")?,
    );
    let cancel = CancellationToken::new();

    let (dispatcher, actions) = Dispatcher::new(store.clone());
    let dispatcher_handle = tokio::spawn(dispatcher.run());

    let channel = if config.enable_socket {
        let wss = WssConfig {
            url: config.socket_url.to_string(),
            connect_timeout: config.request_timeout,
        };
        Some(TelemetryWssIngestor::new(wss, actions).spawn())
    } else {
        drop(actions);
        None
    };

    let poller = Arc::new(TelemetryPoller::new(
        client.clone(),
        store.clone(),
        config.categories.clone(),
        config.poll_interval,
    ));
    let loader = DeliveryLoader::new(client, store.clone());

    let poller_handle = {
        let poller = poller.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { poller.run(cancel).await })
    };
    let render_handle = tokio::spawn(render::run(
        store.clone(),
        render::RenderOptions::from(&config),
        cancel.clone(),
    ));
    if config.profile == Profile::Deliveries {
        let loader = loader.clone();
        tokio::spawn(async move {
            match loader.load_active().await {
                Ok(count) => info!(count, "active deliveries loaded"),
                Err(e) => warn!(error = %e, "active deliveries failed"),
            }
        });
    }
    let input_handle = tokio::spawn(input::run(poller, loader, cancel.clone()));

    // Wait for a shutdown signal or a quit command
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, initiating shutdown.");
        }
        _ = cancel.cancelled() => {
            info!("Quit command received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        warn!(error = %e, "cannot listen for SIGTERM");
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {}
    }

    cancel.cancel();
    if let Some(channel) = channel {
        channel.close().await;
    }
    let _ = tokio::join!(poller_handle, render_handle, input_handle);
    match dispatcher_handle.await {
        Ok(applied) => info!(applied, "real-time actions applied"),
        Err(e) => warn!(error = %e, "dispatcher task failed"),
    }

    info!("Shutdown complete.");
    Ok(())
}
