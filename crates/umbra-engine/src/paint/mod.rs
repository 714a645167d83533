//! Color model shared by the dispatcher and the renderer.

pub mod color;

pub use color::Color;
