//! Suspendable sequencing tasks.
//!
//! A [`Task`] is one in-flight multi-tick sequence expressed as an explicit
//! state machine rather than a coroutine:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Task (sum type)                                             │
//! │  ┌───────────────┬──────────────────────────┬─────────────┐  │
//! │  │ Variant       │ Phases                   │ Resumes on  │  │
//! │  ├───────────────┼──────────────────────────┼─────────────┤  │
//! │  │ Equalize      │ Command, WaitOxygen      │ oxygen      │  │
//! │  │ AirlockCycle  │ Settle, WaitAllClosed,   │ door ratios │  │
//! │  │               │ Equalize                 │ then oxygen │  │
//! │  │ ToggleTwice   │ Sample, Resample,        │ one door's  │  │
//! │  │               │ WaitEndpoint             │ ratio       │  │
//! │  └───────────────┴──────────────────────────┴─────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each resume calls [`Task::advance`], which returns [`Step::Suspended`]
//! (resume me next tick) or [`Step::Completed`].  The
//! [`TaskScheduler`](crate::scheduler::TaskScheduler) owns at most one task.

pub mod context;
pub mod states;

use core::fmt;

use log::info;
use serde::Serialize;

use crate::layout::Side;
use context::StepContext;
use states::{CycleTask, EqualizeTask, ToggleTask};

// ---------------------------------------------------------------------------
// Step result
// ---------------------------------------------------------------------------

/// Result of resuming a task for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Not finished; resume on the next tick.
    Suspended,
    /// Finished; drop the task.
    Completed,
}

// ---------------------------------------------------------------------------
// Task identity
// ---------------------------------------------------------------------------

/// What a task is doing, without its resume state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    /// Pressurize toward a side, then open that side's doors.
    Equalize(Side),
    /// Wait for all doors shut, then cycle to the opposite side.
    AirlockCycle,
    /// Toggle a group, wait for the motion to finish, toggle again.
    ToggleTwice(Side),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equalize(Side::Interior) => write!(f, "pressurize-then-open-interior"),
            Self::Equalize(Side::Exterior) => write!(f, "depressurize-then-open-exterior"),
            Self::AirlockCycle => write!(f, "airlock-cycle"),
            Self::ToggleTwice(side) => write!(f, "toggle-{side}-twice"),
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One suspended sequence, carrying everything it needs to resume.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Equalize(EqualizeTask),
    AirlockCycle(CycleTask),
    ToggleTwice(ToggleTask),
}

impl Task {
    pub fn equalize(side: Side) -> Self {
        Self::Equalize(EqualizeTask::new(side))
    }

    pub fn airlock_cycle() -> Self {
        Self::AirlockCycle(CycleTask::new())
    }

    pub fn toggle_twice(side: Side) -> Self {
        Self::ToggleTwice(ToggleTask::new(side))
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Equalize(t) => TaskKind::Equalize(t.side()),
            Self::AirlockCycle(_) => TaskKind::AirlockCycle,
            Self::ToggleTwice(t) => TaskKind::ToggleTwice(t.side()),
        }
    }

    /// Resume for one step.
    pub fn advance(&mut self, ctx: &mut StepContext<'_>) -> Step {
        match self {
            Self::Equalize(t) => t.advance(ctx),
            Self::AirlockCycle(t) => t.advance(ctx),
            Self::ToggleTwice(t) => t.advance(ctx),
        }
    }

    /// Label of the point the task is suspended at.  Consecutive
    /// suspensions at the same label count against the wait budget.
    pub fn wait_point(&self) -> &'static str {
        match self {
            Self::Equalize(t) => t.wait_point(),
            Self::AirlockCycle(t) => t.wait_point(),
            Self::ToggleTwice(t) => t.wait_point(),
        }
    }

    /// Called when the task is discarded before completing, either by a
    /// newer task or by a timeout.  Actuator commands already issued
    /// stand; nothing is undone.
    pub fn on_cancel(&mut self) {
        info!("Task {} cancelled at '{}'", self.kind(), self.wait_point());
    }
}
