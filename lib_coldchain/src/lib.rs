//! # lib_coldchain
//!
//! Shared building blocks for the cold-chain shipment monitor: typed payload
//! schemas, the reducer-based state store, the HTTP and WebSocket ingestors that
//! keep it fresh, and the derived views the console dashboard renders.
//!
//! Modules that pull in heavy dependencies are gated behind cargo features in the
//! same way as the rest of the workspace (`configs`, `loggers`, `retrieve`,
//! `ingestors`; `full` enables all of them and is the default).

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

pub mod core;
pub mod domain;
pub mod errors;
pub mod views;

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "ingestors")]
pub mod ingestors;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "retrieve")]
pub mod retrieve;

pub use crate::core::{Action, AppStore, DashboardState};
pub use crate::errors::MonitorError;
