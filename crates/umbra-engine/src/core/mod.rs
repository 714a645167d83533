//! Core engine contracts.
//!
//! `Umbra` is the dispatcher handed to every behavior handler. Through it a
//! handler reads frame timing and the canvas, and queues backend work on
//! `GraphicsCtx`; the runtime performs that work once the pass is over.

mod ctx;
mod umbra;

pub use ctx::{Canvas, ClearMask, GraphicsCmd, GraphicsCtx, Viewport};
pub use umbra::{DispatchReport, Umbra, UmbraConfig, VERSION};
