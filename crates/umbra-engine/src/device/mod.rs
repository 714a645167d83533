//! GPU device and surface management.
//!
//! This module is responsible for:
//! - creating the wgpu adapter, device and queue
//! - configuring the window surface and the matching depth buffer
//! - acquiring frames and presenting them

mod gpu;

pub use gpu::{DEPTH_FORMAT, Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
