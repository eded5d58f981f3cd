//! Context handed to every task step.
//!
//! `StepContext` pairs the current configuration snapshot with the
//! actuator gateway for the duration of one step.  Tasks hold no block
//! references of their own beyond opaque [`DoorId`]s, so a `reset` that
//! swaps the layout is picked up on the next step.

use crate::app::ports::{ActuatorGateway, DoorId};
use crate::layout::{AirlockLayout, Side};

pub struct StepContext<'a> {
    pub layout: &'a AirlockLayout,
    pub gateway: &'a mut dyn ActuatorGateway,
}

impl<'a> StepContext<'a> {
    pub fn new(layout: &'a AirlockLayout, gateway: &'a mut dyn ActuatorGateway) -> Self {
        Self { layout, gateway }
    }

    pub fn oxygen_level(&self) -> f32 {
        self.gateway.oxygen_level(self.layout.vent)
    }

    pub fn set_depressurize(&mut self, depressurize: bool) {
        self.gateway.set_depressurize(self.layout.vent, depressurize);
    }

    pub fn open_ratio(&self, door: DoorId) -> Option<f32> {
        self.gateway.open_ratio(door)
    }

    /// Every door on both sides reads fully closed.  A door that cannot be
    /// read does not count as closed.
    pub fn all_doors_closed(&self) -> bool {
        self.layout
            .all_doors()
            .all(|door| self.gateway.open_ratio(door) == Some(0.0))
    }

    pub fn open_side(&mut self, side: Side) {
        for &door in self.layout.group(side).doors() {
            self.gateway.open_door(door);
        }
    }

    pub fn toggle_side(&mut self, side: Side) {
        for &door in self.layout.group(side).doors() {
            self.gateway.toggle_door(door);
        }
    }
}

/// Close every door of `side` immediately (handler path, no task).
pub fn close_side(layout: &AirlockLayout, gateway: &mut dyn ActuatorGateway, side: Side) {
    for &door in layout.group(side).doors() {
        gateway.close_door(door);
    }
}
