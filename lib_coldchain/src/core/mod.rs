//! # Core State Module
//!
//! The shared application state and the only code allowed to mutate it.
//!
//! ## Core Components:
//!
//! - **`reducer`**: `DashboardState` and the `Action`s that transform it. The
//!   transition function is pure; it never performs I/O.
//! - **`store`**: `AppStore`, the cloneable handle constructed once at startup and
//!   passed to every task that reads or writes state. Mutations are serialised and
//!   every subscriber is woken after each one.
//! - **`dispatcher`**: drains a queue of typed `Action`s (fed by the real-time
//!   channel) into the store in arrival order.

pub mod dispatcher;
pub mod reducer;
pub mod store;

pub use dispatcher::{ActionSender, Dispatcher};
pub use reducer::{Action, DashboardState, DEFAULT_HISTORY_WINDOW};
pub use store::AppStore;
