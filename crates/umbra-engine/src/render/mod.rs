//! GPU rendering.
//!
//! Behaviors never touch wgpu. They queue [`GraphicsCmd`](crate::core::GraphicsCmd)s;
//! after each pass the runtime folds them into a [`FramePlan`] and hands that
//! to [`MeshRenderer`].
//!
//! Convention:
//! - transforms are row-major 4×4 matrices applied to row vectors
//! - clip space follows the GL convention (`z` in `[-w, w]`); the vertex
//!   shader remaps depth to wgpu's `[0, w]`

mod ctx;
mod frame;
mod mesh;
mod mesh_renderer;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::{BackendState, FramePlan};
pub use mesh::{DrawMesh, MeshData, MeshVertex};
pub use mesh_renderer::MeshRenderer;
