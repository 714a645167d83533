//! Umbra engine crate.
//!
//! A small real-time framework: a scene graph of nodes carrying behaviors,
//! a dispatcher that fires `Load`/`Update`/`Fixed` across it on two clocks,
//! and a winit + wgpu runtime that performs the graphics work the behaviors
//! queue. Linear algebra comes from `umbra-math`, re-exported as [`math`].

pub mod behaviors;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

pub use umbra_math as math;

pub use crate::core::{Umbra, UmbraConfig, VERSION};
