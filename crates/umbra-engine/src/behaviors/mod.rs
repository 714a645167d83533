//! Ready-made behaviors most scenes attach to their root.

mod background;
mod canvas_resizer;

pub use background::Background;
pub use canvas_resizer::CanvasResizer;
