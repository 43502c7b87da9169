//! # Telemetry WSS Ingestor
//!
//! Push channel for live delivery telemetry and alerts.
//!
//! ## Lifecycle:
//! `Connecting` → `Open` → `Closed`. Reaching `Open` queues `SetConnected(true)`;
//! any error, remote close or local close moves to `Closed` and queues
//! `SetConnected(false)`. `Closed` is terminal: to reconnect, spawn a new
//! ingestor.
//!
//! ## Messages:
//! Every inbound text frame is a `{"type": ..., "data": ...}` envelope.
//! - `telemetry_update` → `AddDeliveryTelemetry`
//! - `alert_update` → `AddAlert`
//!
//! Other types are ignored. Malformed frames are logged and dropped; they never
//! close the channel.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tokio_util::sync::CancellationToken;

use crate::core::{Action, ActionSender};
use crate::domain::{Alert, TelemetryReading};
use crate::errors::MonitorError;

pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:8001/ws";

/// Configuration for the telemetry WebSocket.
#[derive(Debug, Clone)]
pub struct WssConfig {
    pub url: String,
    pub connect_timeout: Duration,
}

impl Default for WssConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOCKET_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Telemetry(TelemetryReading),
    Alert(Alert),
    /// A well-formed envelope of a type this client does not handle.
    Ignored(String),
}

impl InboundEvent {
    pub fn into_action(self) -> Option<Action> {
        match self {
            InboundEvent::Telemetry(reading) => Some(Action::AddDeliveryTelemetry(reading)),
            InboundEvent::Alert(alert) => Some(Action::AddAlert(alert)),
            InboundEvent::Ignored(_) => None,
        }
    }
}

/// Parses one text frame.
///
/// # Errors
/// `MonitorError::Parse` when the frame is not an envelope, or when a known
/// type carries a payload of the wrong shape.
pub fn parse_message(text: &str) -> Result<InboundEvent, MonitorError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    match envelope.kind.as_str() {
        "telemetry_update" => Ok(InboundEvent::Telemetry(serde_json::from_value(envelope.data)?)),
        "alert_update" => Ok(InboundEvent::Alert(serde_json::from_value(envelope.data)?)),
        _ => Ok(InboundEvent::Ignored(envelope.kind)),
    }
}

pub struct TelemetryWssIngestor {
    config: WssConfig,
    actions: ActionSender,
}

impl TelemetryWssIngestor {
    pub fn new(config: WssConfig, actions: ActionSender) -> Self {
        Self { config, actions }
    }

    /// Starts connecting in a background task and returns its handle.
    pub fn spawn(self) -> ChannelHandle {
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(self.run(state_tx, outbound_rx, cancel.clone()));

        ChannelHandle {
            state: state_rx,
            outbound: outbound_tx,
            cancel,
            task: Some(task),
        }
    }

    async fn run(
        self,
        state: watch::Sender<ChannelState>,
        mut outbound: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) {
        tracing::info!(url = %self.config.url, "connecting to telemetry socket");

        let connect = tokio::select! {
            _ = cancel.cancelled() => {
                state.send_replace(ChannelState::Closed);
                return;
            }
            result = tokio::time::timeout(self.config.connect_timeout, connect_async(self.config.url.as_str())) => result,
        };

        let ws_stream = match connect {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                tracing::error!("WebSocket error: {}", e);
                self.mark_closed(&state);
                return;
            }
            Err(_) => {
                tracing::error!(
                    "WebSocket error: connect timed out after {}ms",
                    self.config.connect_timeout.as_millis()
                );
                self.mark_closed(&state);
                return;
            }
        };

        state.send_replace(ChannelState::Open);
        self.queue(Action::SetConnected(true));
        tracing::info!("WebSocket connected");

        let (mut write, mut read) = ws_stream.split();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    let _ = write.close().await;
                    break;
                }
                Some(text) = outbound.recv() => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()),
                    Some(Ok(Message::Binary(bin))) => match std::str::from_utf8(&bin) {
                        Ok(text) => self.handle_text(text),
                        Err(_) => tracing::warn!(bytes = bin.len(), "dropping non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "WebSocket closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        tracing::warn!("WebSocket stream ended");
                        break;
                    }
                }
            }
        }

        self.mark_closed(&state);
        tracing::info!("WebSocket disconnected");
    }

    fn handle_text(&self, text: &str) {
        match parse_message(text) {
            Ok(InboundEvent::Ignored(kind)) => {
                tracing::debug!(kind = %kind, "ignoring message type");
            }
            Ok(event) => {
                if let Some(action) = event.into_action() {
                    self.queue(action);
                }
            }
            Err(e) => tracing::error!("Error parsing WebSocket message: {}", e),
        }
    }

    fn mark_closed(&self, state: &watch::Sender<ChannelState>) {
        state.send_replace(ChannelState::Closed);
        self.queue(Action::SetConnected(false));
    }

    fn queue(&self, action: Action) {
        if self.actions.send(action).is_err() {
            tracing::debug!("action queue closed, dropping channel event");
        }
    }
}

/// Owner side of a spawned channel. Dropping it closes the socket.
pub struct ChannelHandle {
    state: watch::Receiver<ChannelState>,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ChannelHandle {
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    /// Waits until the channel reaches `target`. Returns `false` if the channel
    /// closed first (or `target` can no longer be reached).
    pub async fn wait_for(&mut self, target: ChannelState) -> bool {
        let reached = match self
            .state
            .wait_for(|s| *s == target || *s == ChannelState::Closed)
            .await
        {
            Ok(state) => Some(*state),
            Err(_) => None,
        };
        reached.unwrap_or_else(|| self.state()) == target
    }

    /// Serialises `message` as JSON and queues it. Returns `false` without
    /// sending anything unless the channel is open.
    pub fn send<T: Serialize>(&self, message: &T) -> bool {
        if !self.is_open() {
            return false;
        }
        match serde_json::to_string(message) {
            Ok(text) => self.outbound.send(text).is_ok(),
            Err(e) => {
                tracing::error!("could not serialise outbound message: {}", e);
                false
            }
        }
    }

    /// Closes the socket and waits for the background task to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
