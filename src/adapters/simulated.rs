//! In-memory grid for the simulator and host-side tests.
//!
//! Doors travel between closed (0.0) and open (1.0) at a fixed rate per
//! tick toward their current intent.  The vent moves chamber oxygen toward
//! vacuum or full pressure the same way.  Nothing moves until
//! [`SimulatedGrid::advance_physics`] is called, so a command issued in
//! one tick is observed on the next.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::app::ports::{
    DiscoveryPort, DisplayId, DisplayPort, DoorGroupMatch, DoorId, DoorPort, VentId, VentPort,
};

pub const DEFAULT_DOOR_SPEED: f32 = 0.25;
pub const DEFAULT_VENT_RATE: f32 = 0.2;

/// Parse a per-tick rate for the simulator CLI.  Accepts values in `(0, 1]`.
pub fn parse_rate(s: &str) -> Result<f32, String> {
    let rate: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("expected a number, got: {s}"))?;
    if rate.is_finite() && rate > 0.0 && rate <= 1.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be in (0, 1], got: {s}"))
    }
}

#[derive(Debug, Clone)]
struct SimDoor {
    ratio: f32,
    opening: bool,
    speed: f32,
}

#[derive(Debug, Clone)]
struct SimVent {
    name: String,
    oxygen: f32,
    depressurize: bool,
    rate: f32,
}

#[derive(Debug, Clone)]
struct SimDisplay {
    config_text: String,
    text: String,
}

/// A grid of named door groups, vents and text panels.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGrid {
    doors: BTreeMap<DoorId, SimDoor>,
    groups: Vec<DoorGroupMatch>,
    vents: Vec<SimVent>,
    displays: Vec<SimDisplay>,
    next_door: u32,
}

impl SimulatedGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// One airlock wired the way the bundled sample configuration expects:
    /// two exterior doors, two interior doors, one vent, one info panel,
    /// plus an unrelated hangar group and vent.
    pub fn standard(door_speed: f32, vent_rate: f32) -> Self {
        let mut grid = Self::new();
        grid.add_door_group("Airlock Exterior Doors", 2, door_speed);
        grid.add_door_group("Airlock Interior Doors", 2, door_speed);
        grid.add_door_group("Hangar Doors", 4, door_speed);
        grid.add_vent("Airlock Vent", 1.0, vent_rate);
        grid.add_vent("Hangar Vent", 1.0, vent_rate);
        grid.add_display("[InfoDisplay]\n");
        grid.add_display("");
        grid
    }

    /// Add a group of `count` closed doors.  Returns their handles.
    pub fn add_door_group(&mut self, name: &str, count: usize, speed: f32) -> Vec<DoorId> {
        let ids: Vec<DoorId> = (0..count)
            .map(|_| {
                let id = DoorId(self.next_door);
                self.next_door += 1;
                self.doors.insert(
                    id,
                    SimDoor {
                        ratio: 0.0,
                        opening: false,
                        speed,
                    },
                );
                id
            })
            .collect();
        self.groups.push(DoorGroupMatch {
            name: name.to_string(),
            doors: ids.clone(),
        });
        ids
    }

    pub fn add_vent(&mut self, name: &str, oxygen: f32, rate: f32) -> VentId {
        let id = VentId(self.vents.len() as u32);
        self.vents.push(SimVent {
            name: name.to_string(),
            oxygen: oxygen.clamp(0.0, 1.0),
            depressurize: false,
            rate,
        });
        id
    }

    /// Add a text panel whose own configuration text is `config_text`.
    pub fn add_display(&mut self, config_text: &str) -> DisplayId {
        let id = DisplayId(self.displays.len() as u32);
        self.displays.push(SimDisplay {
            config_text: config_text.to_string(),
            text: String::new(),
        });
        id
    }

    /// Remove a door from the grid.  Its group keeps the stale handle.
    pub fn remove_door(&mut self, door: DoorId) {
        self.doors.remove(&door);
    }

    /// Force a door to `ratio` and point its intent the same way.
    pub fn set_door_ratio(&mut self, door: DoorId, ratio: f32) {
        if let Some(d) = self.doors.get_mut(&door) {
            d.ratio = ratio.clamp(0.0, 1.0);
            d.opening = d.ratio > 0.0;
        }
    }

    pub fn set_oxygen(&mut self, vent: VentId, oxygen: f32) {
        if let Some(v) = self.vents.get_mut(vent.0 as usize) {
            v.oxygen = oxygen.clamp(0.0, 1.0);
        }
    }

    pub fn is_depressurizing(&self, vent: VentId) -> bool {
        self.vents
            .get(vent.0 as usize)
            .is_some_and(|v| v.depressurize)
    }

    pub fn display_text(&self, display: DisplayId) -> Option<&str> {
        self.displays
            .get(display.0 as usize)
            .map(|d| d.text.as_str())
    }

    /// Move every door and vent one tick toward its target.
    pub fn advance_physics(&mut self) {
        for door in self.doors.values_mut() {
            let target = if door.opening { 1.0 } else { 0.0 };
            door.ratio = approach(door.ratio, target, door.speed);
        }
        for vent in &mut self.vents {
            let target = if vent.depressurize { 0.0 } else { 1.0 };
            vent.oxygen = approach(vent.oxygen, target, vent.rate);
        }
    }
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

impl DoorPort for SimulatedGrid {
    fn open_ratio(&self, door: DoorId) -> Option<f32> {
        self.doors.get(&door).map(|d| d.ratio)
    }

    fn open_door(&mut self, door: DoorId) {
        match self.doors.get_mut(&door) {
            Some(d) => d.opening = true,
            None => debug!("Sim: open {} ignored, door missing", door),
        }
    }

    fn close_door(&mut self, door: DoorId) {
        match self.doors.get_mut(&door) {
            Some(d) => d.opening = false,
            None => debug!("Sim: close {} ignored, door missing", door),
        }
    }

    fn toggle_door(&mut self, door: DoorId) {
        match self.doors.get_mut(&door) {
            Some(d) => d.opening = !d.opening,
            None => debug!("Sim: toggle {} ignored, door missing", door),
        }
    }
}

impl VentPort for SimulatedGrid {
    fn oxygen_level(&self, vent: VentId) -> f32 {
        match self.vents.get(vent.0 as usize) {
            Some(v) => v.oxygen,
            None => {
                warn!("Sim: unknown vent {}", vent.0);
                0.0
            }
        }
    }

    fn set_depressurize(&mut self, vent: VentId, depressurize: bool) {
        if let Some(v) = self.vents.get_mut(vent.0 as usize) {
            v.depressurize = depressurize;
        }
    }
}

impl DiscoveryPort for SimulatedGrid {
    fn door_groups(&self, name_matches: &dyn Fn(&str) -> bool) -> Vec<DoorGroupMatch> {
        self.groups
            .iter()
            .filter(|g| name_matches(&g.name))
            .cloned()
            .collect()
    }

    fn vents(&self, name_matches: &dyn Fn(&str) -> bool) -> Vec<VentId> {
        self.vents
            .iter()
            .enumerate()
            .filter(|(_, v)| name_matches(&v.name))
            .map(|(i, _)| VentId(i as u32))
            .collect()
    }

    fn displays(&self, config_matches: &dyn Fn(&str) -> bool) -> Vec<DisplayId> {
        self.displays
            .iter()
            .enumerate()
            .filter(|(_, d)| config_matches(&d.config_text))
            .map(|(i, _)| DisplayId(i as u32))
            .collect()
    }
}

impl DisplayPort for SimulatedGrid {
    fn write_text(&mut self, display: DisplayId, text: &str) {
        if let Some(d) = self.displays.get_mut(display.0 as usize) {
            d.text.clear();
            d.text.push_str(text);
        }
    }
}
