//! # Configuration Modules
//!
//! CLI, environment and JSON-file configuration for the monitor binary.

/// Layered configuration (defaults, config file, env, CLI) resolved into `MonitorConfig`.
pub mod config_monitor;

pub use config_monitor::{load_config, load_config_from, ConfigArgs, MonitorConfig};
