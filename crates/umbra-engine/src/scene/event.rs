use std::fmt;

/// Lifecycle events a behavior can handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    /// Fired once across a tree when it becomes the active scene.
    Load,
    /// Fired once per presented frame.
    Update,
    /// Fired by the fixed-rate timer.
    Fixed,
}

impl Event {
    pub const ALL: [Event; 3] = [Event::Load, Event::Update, Event::Fixed];

    /// Slot in a per-behavior handler table.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Event::Load => 0,
            Event::Update => 1,
            Event::Fixed => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Event::Load => "load",
            Event::Update => "update",
            Event::Fixed => "fixed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
