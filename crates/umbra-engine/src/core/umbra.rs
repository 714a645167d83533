use std::time::{Duration, Instant};

use anyhow::ensure;

use crate::scene::{Behavior, Event, SceneNode};
use crate::time::{FixedTimer, FrameClock, FrameTime};

use super::ctx::{Canvas, GraphicsCtx};

/// Framework version, fixed at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct UmbraConfig {
    /// Fixed updates per second. Must be non-zero.
    pub ups: u32,
    /// Start paused.
    pub paused: bool,
    /// Upper bound on `delta_time`. `None` reports real elapsed time.
    pub max_frame_dt: Option<Duration>,
}

impl Default for UmbraConfig {
    fn default() -> Self {
        Self {
            ups: 30,
            paused: false,
            max_frame_dt: None,
        }
    }
}

/// Outcome of one dispatch pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub event: Event,
    /// Handlers that ran.
    pub invoked: usize,
    /// Handlers that ran and returned an error.
    pub failed: usize,
}

impl DispatchReport {
    fn empty(event: Event) -> Self {
        Self {
            event,
            invoked: 0,
            failed: 0,
        }
    }
}

/// The dispatcher.
///
/// Owns the active scene, the frame clock and the fixed-rate timer, and fires
/// lifecycle events across the scene. Handlers receive `&mut Umbra` and use
/// it to read timing and canvas state and to queue graphics work.
pub struct Umbra {
    pub canvas: Canvas,
    pub gfx: GraphicsCtx,
    /// Seconds between the two most recent frames. Zero before the second.
    pub delta_time: f32,
    /// Gates `Update` and `Fixed`. `Load` always fires.
    pub paused: bool,

    scene: Option<SceneNode>,
    clock: FrameClock,
    fixed: FixedTimer,
    ups: u32,
    last_frame: Option<FrameTime>,
}

impl Umbra {
    pub fn new(config: UmbraConfig) -> anyhow::Result<Self> {
        Self::new_at(config, Instant::now())
    }

    /// Like [`new`](Self::new) with the fixed timer anchored at `start`.
    pub fn new_at(config: UmbraConfig, start: Instant) -> anyhow::Result<Self> {
        ensure!(config.ups > 0, "ups must be greater than zero");

        let clock = match config.max_frame_dt {
            Some(max) => FrameClock::with_max_dt(max),
            None => FrameClock::new(),
        };

        Ok(Self {
            canvas: Canvas::default(),
            gfx: GraphicsCtx::new(),
            delta_time: 0.0,
            paused: config.paused,
            scene: None,
            clock,
            fixed: FixedTimer::starting_at(config.ups, start),
            ups: config.ups,
            last_frame: None,
        })
    }

    pub fn scene(&self) -> Option<&SceneNode> {
        self.scene.as_ref()
    }

    /// Makes `root` the active scene and fires `Load` across it, paused or not.
    pub fn set_scene(&mut self, root: SceneNode) -> DispatchReport {
        log::debug!("scene set: {root:?}");
        self.scene = Some(root);
        self.trigger(Event::Load)
    }

    /// Drops the active scene. Later passes find nothing to run.
    pub fn take_scene(&mut self) -> Option<SceneNode> {
        self.scene.take()
    }

    pub fn ups(&self) -> u32 {
        self.ups
    }

    /// Length of one fixed step.
    pub fn fixed_period(&self) -> Duration {
        self.fixed.period()
    }

    /// When the fixed timer fires next.
    pub fn next_fixed_deadline(&self) -> Instant {
        self.fixed.next_deadline()
    }

    /// Timing of the most recent frame.
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.last_frame
    }

    /// Fires `event` across the enabled part of the active scene.
    ///
    /// The behaviors to run are collected up front in preorder, then stably
    /// sorted by ascending priority. Tree edits made by a handler only show
    /// up in later passes. A handler that fails is logged and the rest of the
    /// pass still runs.
    pub fn trigger(&mut self, event: Event) -> DispatchReport {
        let mut report = DispatchReport::empty(event);
        let Some(root) = self.scene.clone() else {
            return report;
        };

        let mut queue: Vec<Behavior> = root
            .enabled_preorder()
            .iter()
            .flat_map(SceneNode::behaviors)
            .filter(|b| b.handles(event))
            .collect();
        queue.sort_by_key(Behavior::priority);

        for behavior in &queue {
            match behavior.invoke(event, self) {
                // Cleared by an earlier handler in this pass.
                None => {}
                Some(Ok(())) => report.invoked += 1,
                Some(Err(e)) => {
                    report.invoked += 1;
                    report.failed += 1;
                    log::warn!(
                        "{event} handler of {} (priority {}) failed: {e:#}",
                        behavior.kind().name(),
                        behavior.priority(),
                    );
                }
            }
        }

        log::trace!(
            "{event} pass: {} invoked, {} failed",
            report.invoked,
            report.failed
        );
        report
    }

    /// Per-frame step: records `delta_time` and fires `Update` unless paused.
    pub fn frame_at(&mut self, now: Instant) -> Option<DispatchReport> {
        let ft = self.clock.tick_at(now);
        self.delta_time = ft.dt;
        self.last_frame = Some(ft);

        if self.paused {
            return None;
        }
        Some(self.trigger(Event::Update))
    }

    pub fn frame(&mut self) -> Option<DispatchReport> {
        self.frame_at(Instant::now())
    }

    /// Fixed-rate step: fires `Fixed` once per tick due at `now`, unless paused.
    ///
    /// A caller polling slower than `ups` (e.g. once per vsync-paced frame)
    /// gets several passes in one call. The returned report sums them. Ticks
    /// falling due while paused are consumed, not queued.
    pub fn fixed_at(&mut self, now: Instant) -> Option<DispatchReport> {
        let due = self.fixed.poll(now);
        if due == 0 || self.paused {
            return None;
        }

        let mut total = DispatchReport::empty(Event::Fixed);
        for _ in 0..due {
            let pass = self.trigger(Event::Fixed);
            total.invoked += pass.invoked;
            total.failed += pass.failed;
        }
        Some(total)
    }

    pub fn fixed(&mut self) -> Option<DispatchReport> {
        self.fixed_at(Instant::now())
    }
}
