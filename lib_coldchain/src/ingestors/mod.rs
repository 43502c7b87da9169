//! # Data Ingestors Module
//!
//! Everything that brings backend data into the store. Each submodule is one
//! source with its own lifecycle:
//!
//! ## Contained Modules:
//! - **`telemetry_polling`**: the periodic REST refresh of every data category a
//!   profile displays, with a manual trigger.
//! - **`telemetry_wss`**: the push channel. Parses `{type, data}` envelopes into
//!   actions and queues them for the dispatcher.
//! - **`delivery_fetch`**: on-demand loads (active delivery list, one delivery's
//!   history) that report failures to the user instead of keeping stale data.

/// Periodic refresh of the REST data categories.
pub mod telemetry_polling;
/// WebSocket push channel.
pub mod telemetry_wss;
/// Delivery list and delivery detail loaders.
pub mod delivery_fetch;

pub use delivery_fetch::DeliveryLoader;
pub use telemetry_polling::{RefreshReport, TelemetryPoller};
pub use telemetry_wss::{ChannelHandle, ChannelState, TelemetryWssIngestor, WssConfig};
