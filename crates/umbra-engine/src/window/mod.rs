//! Window and event loop.
//!
//! Owns the `winit` event loop and the window, drives the dispatcher's two
//! clocks from it and hands queued graphics work to the GPU layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
