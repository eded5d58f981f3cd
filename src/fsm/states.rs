//! Per-task phase logic.
//!
//! Each task is a small explicit state machine.  `advance` runs from the
//! current phase until the next suspend point or until the task is done,
//! so one call does bounded work and never blocks.
//!
//! ```text
//!  Equalize(side):   Command ─▶ WaitOxygen ─[equalized]─▶ open side ─▶ done
//!
//!  AirlockCycle:     Settle ─▶ WaitAllClosed ─[all ratio 0]─▶ Decide
//!                                      oxygen > 0.5 ──▶ Equalize(Exterior)
//!                                      oxygen ≤ 0.5 ──▶ Equalize(Interior)
//!
//!  ToggleTwice(side): Sample ─▶ Resample+toggle ─▶ WaitEndpoint ─▶ toggle ─▶ done
//! ```

use log::{debug, info, warn};

use super::Step;
use super::context::StepContext;
use crate::app::ports::DoorId;
use crate::layout::Side;

/// Oxygen level above which the chamber is taken to have last been
/// equalized with the interior.  A heuristic, not a measurement.
pub const PRESSURE_SIDE_THRESHOLD: f32 = 0.5;

/// Which side to open after all doors are shut, given the chamber's
/// oxygen level.  Exactly 0.5 routes to the interior.
pub fn decide_side(oxygen_level: f32) -> Side {
    if oxygen_level > PRESSURE_SIDE_THRESHOLD {
        Side::Exterior
    } else {
        Side::Interior
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Equalize: pressurize or depressurize, then open one side
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EqualizePhase {
    Command,
    WaitOxygen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualizeTask {
    side: Side,
    phase: EqualizePhase,
}

impl EqualizeTask {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            phase: EqualizePhase::Command,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn advance(&mut self, ctx: &mut StepContext<'_>) -> Step {
        if self.phase == EqualizePhase::Command {
            ctx.set_depressurize(self.side.depressurize());
            info!(
                "EQUALIZE: vent {} toward {}",
                if self.side.depressurize() { "depressurizing" } else { "pressurizing" },
                self.side
            );
            self.phase = EqualizePhase::WaitOxygen;
        }

        let level = ctx.oxygen_level();
        if !self.side.is_equalized(level) {
            return Step::Suspended;
        }

        ctx.open_side(self.side);
        info!("EQUALIZE: oxygen {:.2}, {} doors opened", level, self.side);
        Step::Completed
    }

    pub fn wait_point(&self) -> &'static str {
        match self.phase {
            EqualizePhase::Command => "vent-command",
            EqualizePhase::WaitOxygen => "oxygen",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  AirlockCycle: wait for all doors shut, then equalize toward the far side
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
enum CyclePhase {
    /// Yield once so door commands issued this tick can take effect.
    Settle,
    WaitAllClosed,
    Equalize(EqualizeTask),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTask {
    phase: CyclePhase,
}

impl CycleTask {
    pub fn new() -> Self {
        Self {
            phase: CyclePhase::Settle,
        }
    }

    /// The side being equalized, once the decide step has run.
    pub fn target(&self) -> Option<Side> {
        match &self.phase {
            CyclePhase::Equalize(task) => Some(task.side()),
            _ => None,
        }
    }

    pub fn advance(&mut self, ctx: &mut StepContext<'_>) -> Step {
        loop {
            match &mut self.phase {
                CyclePhase::Settle => {
                    self.phase = CyclePhase::WaitAllClosed;
                    return Step::Suspended;
                }
                CyclePhase::WaitAllClosed => {
                    if !ctx.all_doors_closed() {
                        return Step::Suspended;
                    }
                    let level = ctx.oxygen_level();
                    let side = decide_side(level);
                    info!("CYCLE: all doors closed, oxygen {:.2} → cycling to {}", level, side);
                    self.phase = CyclePhase::Equalize(EqualizeTask::new(side));
                }
                CyclePhase::Equalize(task) => return task.advance(ctx),
            }
        }
    }

    pub fn wait_point(&self) -> &'static str {
        match &self.phase {
            CyclePhase::Settle => "settle",
            CyclePhase::WaitAllClosed => "doors-closed",
            CyclePhase::Equalize(task) => task.wait_point(),
        }
    }
}

impl Default for CycleTask {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ToggleTwice: drive a hangar-style group through a full motion
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
enum TogglePhase {
    Sample,
    Resample { door: DoorId, prev: Option<f32> },
    WaitEndpoint { door: DoorId, target: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleTask {
    side: Side,
    phase: TogglePhase,
}

impl ToggleTask {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            phase: TogglePhase::Sample,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn advance(&mut self, ctx: &mut StepContext<'_>) -> Step {
        match self.phase {
            TogglePhase::Sample => {
                let Some(door) = ctx.layout.group(self.side).representative() else {
                    warn!("TOGGLE: {} group has no doors, nothing to do", self.side);
                    return Step::Completed;
                };
                let prev = ctx.open_ratio(door);
                self.phase = TogglePhase::Resample { door, prev };
                Step::Suspended
            }
            TogglePhase::Resample { door, prev } => {
                let curr = ctx.open_ratio(door);
                let opening = match (prev, curr) {
                    (Some(prev), Some(curr)) => {
                        let delta = curr - prev;
                        debug!("TOGGLE: door {} ratio {:.2}, moving={}", door, curr, delta != 0.0);
                        delta < 0.0 || curr == 0.0
                    }
                    _ => {
                        warn!("TOGGLE: door {} unreadable, assuming closed", door);
                        true
                    }
                };
                ctx.toggle_side(self.side);
                let target = if opening { 1.0 } else { 0.0 };
                info!(
                    "TOGGLE: {} doors toggled, {} until ratio {}",
                    self.side,
                    if opening { "opening" } else { "closing" },
                    target
                );
                self.phase = TogglePhase::WaitEndpoint { door, target };
                Step::Suspended
            }
            TogglePhase::WaitEndpoint { door, target } => {
                if ctx.open_ratio(door) != Some(target) {
                    return Step::Suspended;
                }
                ctx.toggle_side(self.side);
                info!("TOGGLE: {} doors reached {}, toggled back", self.side, target);
                Step::Completed
            }
        }
    }

    pub fn wait_point(&self) -> &'static str {
        match self.phase {
            TogglePhase::Sample => "sample",
            TogglePhase::Resample { .. } => "resample",
            TogglePhase::WaitEndpoint { .. } => "door-endpoint",
        }
    }
}
