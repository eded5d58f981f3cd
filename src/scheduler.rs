//! Single-slot cooperative task scheduler.
//!
//! ```text
//!   handler ──start(task)──▶ ┌───────────────────────┐
//!                            │  TaskScheduler        │   armed?
//!                            │  slot: Option<Task>   │ ───────▶ host delivers
//!   host tick (ONCE) ─step──▶│  armed, wait budget   │          next ONCE tick
//!                            └───────────────────────┘
//! ```
//!
//! Ticks are metered by the host, so the scheduler re-arms only while a
//! task is pending.  Starting a task replaces whatever was running; that
//! is the only cancellation path.  An optional wait budget abandons a
//! task that stays suspended at one wait point for too many ticks.

use log::{debug, info, warn};

use crate::fsm::context::StepContext;
use crate::fsm::{Step, Task, TaskKind};

/// What one call to [`TaskScheduler::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No task was installed.
    Idle,
    /// The task suspended; another resume is armed.
    Suspended(TaskKind),
    /// The task finished and was dropped.
    Completed(TaskKind),
    /// The task exceeded the wait budget and was dropped.
    TimedOut {
        kind: TaskKind,
        wait_point: &'static str,
        ticks: u32,
    },
}

/// Consecutive suspensions at one wait point.
#[derive(Debug, Clone, Copy, Default)]
struct WaitTracker {
    point: Option<&'static str>,
    ticks: u32,
}

impl WaitTracker {
    fn record(&mut self, point: &'static str) -> u32 {
        if self.point == Some(point) {
            self.ticks = self.ticks.saturating_add(1);
        } else {
            self.point = Some(point);
            self.ticks = 1;
        }
        self.ticks
    }
}

pub struct TaskScheduler {
    current: Option<Box<Task>>,
    armed: bool,
    /// `None` lets a task wait forever.
    wait_budget: Option<u32>,
    wait: WaitTracker,
}

impl TaskScheduler {
    pub fn new(wait_budget: Option<u32>) -> Self {
        Self {
            current: None,
            armed: false,
            wait_budget,
            wait: WaitTracker::default(),
        }
    }

    pub fn set_wait_budget(&mut self, wait_budget: Option<u32>) {
        self.wait_budget = wait_budget;
    }

    /// Install `task` and arm one resume.  Returns the kind of the task
    /// it displaced, if any.
    pub fn start(&mut self, task: Task) -> Option<TaskKind> {
        info!("Scheduler: starting {}", task.kind());
        let displaced = self.current.replace(Box::new(task)).map(|mut old| {
            old.on_cancel();
            old.kind()
        });
        self.wait = WaitTracker::default();
        self.armed = true;
        displaced
    }

    /// Drop the current task, if any, without arming.
    pub fn cancel(&mut self) -> Option<TaskKind> {
        self.armed = false;
        self.wait = WaitTracker::default();
        self.current.take().map(|mut old| {
            old.on_cancel();
            old.kind()
        })
    }

    /// Resume the current task for one step.  Consumes the armed resume.
    pub fn step(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        self.armed = false;
        let Some(task) = self.current.as_mut() else {
            return StepOutcome::Idle;
        };
        let kind = task.kind();

        match task.advance(ctx) {
            Step::Completed => {
                info!("Scheduler: {} completed", kind);
                self.current = None;
                self.wait = WaitTracker::default();
                StepOutcome::Completed(kind)
            }
            Step::Suspended => {
                let wait_point = task.wait_point();
                let ticks = self.wait.record(wait_point);
                if self.wait_budget.is_some_and(|budget| ticks > budget) {
                    warn!(
                        "Scheduler: {} waited {} ticks at '{}', abandoning",
                        kind, ticks, wait_point
                    );
                    task.on_cancel();
                    self.current = None;
                    self.wait = WaitTracker::default();
                    return StepOutcome::TimedOut {
                        kind,
                        wait_point,
                        ticks,
                    };
                }
                debug!("Scheduler: {} suspended at '{}' ({})", kind, wait_point, ticks);
                self.armed = true;
                StepOutcome::Suspended(kind)
            }
        }
    }

    /// Whether the host should deliver a resume tick.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn current_kind(&self) -> Option<TaskKind> {
        self.current.as_ref().map(|t| t.kind())
    }

    pub fn current_wait_point(&self) -> Option<&'static str> {
        self.current.as_ref().map(|t| t.wait_point())
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(None)
    }
}
