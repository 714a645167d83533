use std::time::{Duration, Instant};

/// Fixed-rate pacing for the `Fixed` update pass.
///
/// The timer holds the deadline of the next tick. Deadlines advance by exactly
/// one period per tick, so a caller polling slower than `ups` still sees every
/// tick: one poll reports all periods that fell due since the last one. After
/// a stall longer than [`MAX_CATCH_UP`](Self::MAX_CATCH_UP) periods the excess
/// is dropped and the schedule re-anchors on the poll time.
#[derive(Debug, Clone)]
pub struct FixedTimer {
    period: Duration,
    next: Instant,
    ticks: u64,
}

impl FixedTimer {
    /// Most ticks a single poll reports.
    pub const MAX_CATCH_UP: u32 = 8;

    /// Creates a timer whose first tick is one period after `start`.
    ///
    /// `ups` must be non-zero.
    pub fn starting_at(ups: u32, start: Instant) -> Self {
        debug_assert!(ups > 0, "FixedTimer: ups must be non-zero");
        let period = Duration::from_secs_f64(1.0 / f64::from(ups.max(1))).max(Duration::from_nanos(1));
        Self {
            period,
            next: start + period,
            ticks: 0,
        }
    }

    pub fn new(ups: u32) -> Self {
        Self::starting_at(ups, Instant::now())
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Instant at which the next poll will fire.
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Number of ticks fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Restarts the schedule from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.next = now + self.period;
    }

    /// Consumes every tick due at `now` and returns how many there were.
    pub fn poll(&mut self, now: Instant) -> u32 {
        if now < self.next {
            return 0;
        }

        let behind = (now - self.next).as_nanos() / self.period.as_nanos();
        let due = match u32::try_from(behind + 1) {
            Ok(n) if n <= Self::MAX_CATCH_UP => {
                self.next += self.period * n;
                n
            }
            _ => {
                self.next = now + self.period;
                Self::MAX_CATCH_UP
            }
        };

        self.ticks += u64::from(due);
        due
    }
}
