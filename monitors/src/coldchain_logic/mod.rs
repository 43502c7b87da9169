//! Pieces of the `monitor_coldchain` binary: the console renderer and the
//! keyboard command loop.

pub mod input;
pub mod render;
