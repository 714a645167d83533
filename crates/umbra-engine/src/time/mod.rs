//! Time subsystem.
//!
//! Two clocks drive the dispatcher:
//! - `FrameClock` measures the gap between presented frames (`delta_time`)
//! - `FixedTimer` paces the fixed-rate update pass at a configured `ups`
//!
//! Both accept explicit `Instant`s so tests never sleep.

mod fixed_timer;
mod frame_clock;

pub use fixed_timer::FixedTimer;
pub use frame_clock::{FrameClock, FrameTime};
