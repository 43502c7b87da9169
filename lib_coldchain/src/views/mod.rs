//! # Derived Views
//!
//! Pure functions from a `DashboardState` snapshot to display models. Nothing
//! here touches the store or the network, and every status decision goes
//! through the one `Thresholds` table in `thresholds`.
//!
//! ## Contained Modules:
//! - **`thresholds`**: limits, `Status` (NORMAL / AVISO / ALERTA) and reasons.
//! - **`package_stats`**: latest reading per package.
//! - **`deliveries`**: active delivery table and the selected delivery detail.
//! - **`charts`**: temperature / g-force line series.
//! - **`map`**: markers, bounds and centre.
//! - **`kpi_cards`**: the six KPI cards.
//! - **`alert_panel`**: the alert list.

pub mod alert_panel;
pub mod charts;
pub mod deliveries;
pub mod kpi_cards;
pub mod map;
pub mod package_stats;
pub mod thresholds;

pub use thresholds::{Classification, Limit, Metric, Status, Thresholds};
