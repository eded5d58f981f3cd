//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade.  The simulator installs a subscriber that prints them;
//! the operator-facing lines (`Reset: ...`, `Invalid Argument: ...`)
//! keep the wording players expect on the programmable block's console.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ResetCompleted {
                displays,
                exterior_doors,
                interior_doors,
            } => {
                info!(
                    "RESET | Found {} info panels | exterior={} interior={} doors",
                    displays, exterior_doors, interior_doors
                );
            }
            AppEvent::ResetFailed(e) => {
                error!("RESET | {}", e);
            }
            AppEvent::InvalidArgument(token) => {
                warn!("INPUT | Invalid Argument: {}", token);
            }
            AppEvent::TaskStarted(kind) => {
                info!("TASK  | start {}", kind);
            }
            AppEvent::TaskSuperseded(kind) => {
                info!("TASK  | {} superseded", kind);
            }
            AppEvent::TaskCompleted(kind) => {
                info!("TASK  | {} done", kind);
            }
            AppEvent::TaskTimedOut {
                kind,
                wait_point,
                ticks,
            } => {
                warn!("TASK  | {} timed out at '{}' after {} ticks", kind, wait_point, ticks);
            }
            AppEvent::OccupancyUnderflow(cmd) => {
                warn!("OCCUP | {} with nobody inside", cmd);
            }
        }
    }
}
