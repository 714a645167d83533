//! Umbra math.
//!
//! Arbitrary-length vectors, row-major square matrices with Gauss-Jordan
//! inversion, 4×4 transform composition and camera projections.
//!
//! Conventions:
//! - matrices are flattened row-major (`y * dim + x`)
//! - vectors are rows multiplied on the left
//! - composing a transform applies it before everything composed earlier

mod buffer;
mod camera;
mod error;
mod matrix;
mod vector;

pub use buffer::NumericBuffer;
pub use camera::Camera;
pub use error::MathError;
pub use matrix::{invert_buffer, Matrix};
pub use vector::Vector;

/// Converts an angle in degrees to radians.
#[inline]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * core::f32::consts::PI / 180.0
}
