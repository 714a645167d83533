use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick. Zero on the first tick after a reset.
    pub dt: f32,

    /// Timestamp the tick was taken at.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Measures elapsed time between consecutive frames.
///
/// The first tick has no predecessor and reports `dt == 0`. An optional upper
/// clamp keeps a long stall (debugger, minimized window) from producing one
/// giant step; it is off by default so `dt` reports real wall time.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_max: Option<Duration>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock that never reports more than `dt_max` per frame.
    pub fn with_max_dt(dt_max: Duration) -> Self {
        Self {
            dt_max: Some(dt_max),
            ..Self::default()
        }
    }

    /// Forgets the previous tick; the next one reports `dt == 0`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock using the current time.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now` and returns the resulting snapshot.
    ///
    /// A `now` earlier than the previous tick saturates to a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let mut dt = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        if let Some(max) = self.dt_max {
            dt = dt.min(max);
        }

        self.last = Some(now);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}
