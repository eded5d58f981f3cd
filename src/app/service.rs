//! Airlock service: the hexagonal core.
//!
//! [`AirlockService`] owns the configuration snapshot, the occupancy
//! counter and the task scheduler.  The host calls [`AirlockService::run`]
//! once per invocation; all grid I/O flows through the port traits passed
//! in at the call site.
//!
//! ```text
//!  argument ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!               │        AirlockService         │
//!  GridPort ◀──▶│ handlers · occupancy · tasks  │ ──▶ DisplayPort
//!               └──────────────────────────────┘
//! ```
//!
//! Within one invocation the command handler runs first, then (on a
//! resume tick) exactly one task step.

use log::{debug, error, warn};

use crate::error::{ConfigError, Error, Result};
use crate::fsm::Task;
use crate::fsm::context::{self, StepContext};
use crate::layout::{self, AirlockLayout, DoorGroup, Side};
use crate::occupancy::{ExitOutcome, Occupancy};
use crate::scheduler::{StepOutcome, TaskScheduler};

use super::commands::{self, AirlockCommand, UpdateSource};
use super::events::{AirlockStatus, AppEvent};
use super::ports::{ActuatorGateway, DiscoveryPort, DisplayId, EventSink, GridPort};

/// Latest result of `reset`.
#[derive(Debug, Clone)]
enum Configuration {
    Ready(AirlockLayout),
    /// Halted: only `reset` is accepted.
    Faulted(ConfigError),
}

// ───────────────────────────────────────────────────────────────
// AirlockService
// ───────────────────────────────────────────────────────────────

pub struct AirlockService {
    config_text: String,
    configuration: Configuration,
    /// Panels found by the last successful reset; kept while halted.
    displays: Vec<DisplayId>,
    occupancy: Occupancy,
    scheduler: TaskScheduler,
    tick_count: u64,
}

impl AirlockService {
    /// Construct the service and run the initial `reset`.
    pub fn new(
        config_text: impl Into<String>,
        grid: &impl DiscoveryPort,
        sink: &mut impl EventSink,
    ) -> Result<Self> {
        let config_text = config_text.into();
        let layout = match layout::resolve(&config_text, grid) {
            Ok(layout) => layout,
            Err(e) => {
                error!("Startup reset failed: {}", e);
                sink.emit(&AppEvent::ResetFailed(e.clone()));
                return Err(Error::Config(e));
            }
        };
        emit_reset(&layout, sink);

        Ok(Self {
            config_text,
            scheduler: TaskScheduler::new(layout.settings.wait_budget_ticks),
            displays: layout.displays.clone(),
            configuration: Configuration::Ready(layout),
            occupancy: Occupancy::new(),
            tick_count: 0,
        })
    }

    /// Replace the configuration text read by the next `reset`.
    pub fn set_config_text(&mut self, text: impl Into<String>) {
        self.config_text = text.into();
    }

    // ── Tick entry point ──────────────────────────────────────

    /// Handle one host invocation: at most one command, then one task
    /// step if `source` carries the resume tick.
    ///
    /// Errors only when configuration is (or becomes) invalid.  Displays
    /// are refreshed either way.
    pub fn run(
        &mut self,
        argument: &str,
        source: UpdateSource,
        grid: &mut impl GridPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.tick_count += 1;
        let result = self.dispatch(argument, source, grid, sink);
        self.refresh_displays(grid);
        result
    }

    fn dispatch(
        &mut self,
        argument: &str,
        source: UpdateSource,
        grid: &mut impl GridPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match commands::parse_line(argument) {
            Ok(Some(cmd)) => self.handle_command(cmd, grid, sink)?,
            Ok(None) => {}
            Err(unknown) => {
                warn!("{}", unknown);
                sink.emit(&AppEvent::InvalidArgument(unknown.0));
            }
        }

        if source.contains(UpdateSource::ONCE) {
            self.step_task(grid, sink)?;
        } else if let Configuration::Faulted(e) = &self.configuration {
            return Err(Error::Faulted(e.clone()));
        }
        Ok(())
    }

    // ── Command handling ──────────────────────────────────────

    /// Run the handler for one named event.
    pub fn handle_command(
        &mut self,
        cmd: AirlockCommand,
        grid: &mut impl GridPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if cmd == AirlockCommand::Reset {
            return self.reset(&*grid, sink);
        }

        let layout = match &self.configuration {
            Configuration::Ready(layout) => layout,
            Configuration::Faulted(e) => return Err(Error::Faulted(e.clone())),
        };
        debug!("Command: {} (occupancy {})", cmd, self.occupancy.count());

        match cmd {
            // Handled above.
            AirlockCommand::Reset => {}

            AirlockCommand::InteriorEnter => {
                if self.occupancy.enter() {
                    start_task(&mut self.scheduler, Task::equalize(Side::Interior), sink);
                }
            }
            AirlockCommand::InteriorExit => {
                record_exit(&mut self.occupancy, cmd, sink);
                context::close_side(layout, grid, Side::Interior);
            }
            AirlockCommand::AirlockEnter => {
                self.occupancy.enter();
                start_task(&mut self.scheduler, Task::airlock_cycle(), sink);
            }
            AirlockCommand::AirlockExit => {
                record_exit(&mut self.occupancy, cmd, sink);
            }
            AirlockCommand::ExteriorEnter => {
                if self.occupancy.enter() {
                    start_task(&mut self.scheduler, Task::equalize(Side::Exterior), sink);
                }
            }
            AirlockCommand::ExteriorExit => {
                record_exit(&mut self.occupancy, cmd, sink);
                context::close_side(layout, grid, Side::Exterior);
            }
            AirlockCommand::ToggleInterior => {
                start_task(&mut self.scheduler, Task::toggle_twice(Side::Interior), sink);
            }
            AirlockCommand::ToggleExterior => {
                start_task(&mut self.scheduler, Task::toggle_twice(Side::Exterior), sink);
            }
        }
        Ok(())
    }

    /// Re-resolve the configuration text against the grid.
    ///
    /// On success the running task (if any) continues against the new
    /// snapshot.  On failure the task is dropped and the service halts.
    pub fn reset(&mut self, grid: &impl DiscoveryPort, sink: &mut impl EventSink) -> Result<()> {
        match layout::resolve(&self.config_text, grid) {
            Ok(layout) => {
                emit_reset(&layout, sink);
                self.scheduler.set_wait_budget(layout.settings.wait_budget_ticks);
                self.displays = layout.displays.clone();
                self.configuration = Configuration::Ready(layout);
                Ok(())
            }
            Err(e) => {
                error!("Reset failed: {}", e);
                if let Some(kind) = self.scheduler.cancel() {
                    warn!("Reset failed with {} in flight; task dropped", kind);
                }
                sink.emit(&AppEvent::ResetFailed(e.clone()));
                self.configuration = Configuration::Faulted(e.clone());
                Err(Error::Config(e))
            }
        }
    }

    fn step_task(&mut self, grid: &mut impl GridPort, sink: &mut impl EventSink) -> Result<()> {
        let layout = match &self.configuration {
            Configuration::Ready(layout) => layout,
            Configuration::Faulted(e) => return Err(Error::Faulted(e.clone())),
        };
        let mut ctx = StepContext::new(layout, grid);

        match self.scheduler.step(&mut ctx) {
            StepOutcome::Idle | StepOutcome::Suspended(_) => {}
            StepOutcome::Completed(kind) => sink.emit(&AppEvent::TaskCompleted(kind)),
            StepOutcome::TimedOut {
                kind,
                wait_point,
                ticks,
            } => sink.emit(&AppEvent::TaskTimedOut {
                kind,
                wait_point,
                ticks,
            }),
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether the host should deliver the next invocation with
    /// [`UpdateSource::ONCE`].
    pub fn update_requested(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy.count()
    }

    pub fn current_task(&self) -> Option<crate::fsm::TaskKind> {
        self.scheduler.current_kind()
    }

    /// The active configuration snapshot; `None` while halted.
    pub fn layout(&self) -> Option<&AirlockLayout> {
        match &self.configuration {
            Configuration::Ready(layout) => Some(layout),
            Configuration::Faulted(_) => None,
        }
    }

    pub fn fault(&self) -> Option<&ConfigError> {
        match &self.configuration {
            Configuration::Ready(_) => None,
            Configuration::Faulted(e) => Some(e),
        }
    }

    /// Host invocations handled since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Build a status snapshot from the live grid.
    pub fn status(&self, grid: &impl ActuatorGateway) -> AirlockStatus {
        let layout = self.layout();
        let widest = |group: &DoorGroup| {
            group
                .doors()
                .iter()
                .filter_map(|d| grid.open_ratio(*d))
                .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |a| a.max(r))))
        };

        AirlockStatus {
            tick: self.tick_count,
            occupancy: self.occupancy.count(),
            task: self.scheduler.current_kind(),
            wait_point: self.scheduler.current_wait_point(),
            update_requested: self.update_requested(),
            oxygen_level: layout.map(|l| grid.oxygen_level(l.vent)),
            exterior_open: layout.and_then(|l| widest(&l.exterior)),
            interior_open: layout.and_then(|l| widest(&l.interior)),
            fault: self.fault().map(ToString::to_string),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Halted services keep writing to the last known panels so the
    /// fault is visible on the grid.
    fn refresh_displays(&self, grid: &mut impl GridPort) {
        if self.displays.is_empty() {
            return;
        }
        let text = self.status(&*grid).render();
        for &display in &self.displays {
            grid.write_text(display, &text);
        }
    }
}

fn emit_reset(layout: &AirlockLayout, sink: &mut impl EventSink) {
    debug!("Reset: Found {} info panels", layout.displays.len());
    sink.emit(&AppEvent::ResetCompleted {
        displays: layout.displays.len(),
        exterior_doors: layout.exterior.len(),
        interior_doors: layout.interior.len(),
    });
}

fn start_task(scheduler: &mut TaskScheduler, task: Task, sink: &mut impl EventSink) {
    let kind = task.kind();
    if let Some(displaced) = scheduler.start(task) {
        sink.emit(&AppEvent::TaskSuperseded(displaced));
    }
    sink.emit(&AppEvent::TaskStarted(kind));
}

fn record_exit(occupancy: &mut Occupancy, cmd: AirlockCommand, sink: &mut impl EventSink) {
    if occupancy.exit() == ExitOutcome::Underflow {
        sink.emit(&AppEvent::OccupancyUnderflow(cmd));
    }
}
