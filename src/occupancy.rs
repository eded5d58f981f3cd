//! Sensor occupancy counter.
//!
//! One counter is shared by the interior, chamber and exterior sensors.
//! A person walking interior → chamber → exterior keeps it above zero the
//! whole way, so the exterior sensor does not restart a sequence the
//! chamber sensor already drives.
//!
//! An exit with no matching enter would drive the count negative.  The
//! counter clamps at zero instead and reports the anomaly to the caller.

use log::warn;

/// Outcome of an [`Occupancy::exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Count decremented normally.
    Left { remaining: u32 },
    /// Count was already zero; nothing changed.
    Underflow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occupancy {
    count: u32,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an enter.  Returns `true` on the 0 → 1 transition.
    pub fn enter(&mut self) -> bool {
        let was_empty = self.count == 0;
        self.count = self.count.saturating_add(1);
        was_empty
    }

    /// Record an exit.
    pub fn exit(&mut self) -> ExitOutcome {
        if self.count == 0 {
            warn!("Occupancy: exit with no occupant recorded, clamping at 0");
            return ExitOutcome::Underflow;
        }
        self.count -= 1;
        ExitOutcome::Left {
            remaining: self.count,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
