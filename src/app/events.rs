//! Outbound application events.
//!
//! The [`AirlockService`](super::service::AirlockService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log, echo to the operator,
//! count in a test.

use serde::Serialize;

use super::commands::AirlockCommand;
use crate::error::ConfigError;
use crate::fsm::TaskKind;
use crate::layout::Side;

/// Structured events emitted by the service.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Configuration resolved.
    ResetCompleted {
        displays: usize,
        exterior_doors: usize,
        interior_doors: usize,
    },

    /// Configuration failed; the service is halted until the next `reset`.
    ResetFailed(ConfigError),

    /// The argument named no command.
    InvalidArgument(String),

    /// A task was installed in the scheduler.
    TaskStarted(TaskKind),

    /// A task was discarded by a newer one before finishing.
    TaskSuperseded(TaskKind),

    TaskCompleted(TaskKind),

    /// A task exceeded the wait budget at one suspend point.
    TaskTimedOut {
        kind: TaskKind,
        wait_point: &'static str,
        ticks: u32,
    },

    /// An exit arrived with the occupancy counter already at zero.
    OccupancyUnderflow(AirlockCommand),
}

/// Point-in-time view of the airlock, for displays and the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirlockStatus {
    /// Host invocations since startup.
    pub tick: u64,
    pub occupancy: u32,
    pub task: Option<TaskKind>,
    pub wait_point: Option<&'static str>,
    /// Whether the service wants a resume tick.
    pub update_requested: bool,
    /// `None` while halted.
    pub oxygen_level: Option<f32>,
    /// Largest open ratio in the exterior group.
    pub exterior_open: Option<f32>,
    /// Largest open ratio in the interior group.
    pub interior_open: Option<f32>,
    pub fault: Option<String>,
}

impl AirlockStatus {
    pub fn side_open(&self, side: Side) -> Option<f32> {
        match side {
            Side::Interior => self.interior_open,
            Side::Exterior => self.exterior_open,
        }
    }

    /// Multi-line text for an info panel.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(6);
        if let Some(fault) = &self.fault {
            lines.push("AIRLOCK HALTED".to_string());
            lines.push(fault.clone());
            return lines.join("\n");
        }
        lines.push(format!("Airlock  tick {}", self.tick));
        if let Some(level) = self.oxygen_level {
            lines.push(format!("Oxygen   {:>3.0}%", level * 100.0));
        }
        for side in [Side::Interior, Side::Exterior] {
            let state = match self.side_open(side) {
                Some(r) if r <= 0.0 => "closed".to_string(),
                Some(r) if r >= 1.0 => "open".to_string(),
                Some(r) => format!("{:.0}%", r * 100.0),
                None => "unknown".to_string(),
            };
            lines.push(format!("{:<8} {}", side.to_string(), state));
        }
        lines.push(format!("Occupied {}", self.occupancy));
        match (self.task, self.wait_point) {
            (Some(task), Some(point)) => lines.push(format!("Task     {task} @ {point}")),
            _ => lines.push("Task     idle".to_string()),
        }
        lines.join("\n")
    }
}
