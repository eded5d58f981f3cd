//! Port traits: the hexagonal boundary between sequencing logic and the grid.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AirlockService (domain)
//! ```
//!
//! Driven adapters (the simulated grid, a real block API, test mocks)
//! implement these traits.  The [`AirlockService`](super::service::AirlockService)
//! consumes them via generics, so the core never touches blocks directly.
//!
//! Name matching is injected as a predicate: adapters enumerate their blocks
//! and ask the core which names qualify.  The core only cares that exactly
//! one group or vent matches.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Opaque handles
// ───────────────────────────────────────────────────────────────

/// Handle for one door actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoorId(pub u32);

/// Handle for one air vent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VentId(pub u32);

/// Handle for one text display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u32);

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Door port (domain ↔ door actuators)
// ───────────────────────────────────────────────────────────────

/// Door readouts and commands.
pub trait DoorPort {
    /// Observed open ratio in `[0, 1]` (0 = fully closed).
    /// `None` when the door no longer exists on the grid.
    fn open_ratio(&self, door: DoorId) -> Option<f32>;

    fn open_door(&mut self, door: DoorId);

    fn close_door(&mut self, door: DoorId);

    /// Flip the door's intent (opening ↔ closing).
    fn toggle_door(&mut self, door: DoorId);
}

// ───────────────────────────────────────────────────────────────
// Vent port (domain ↔ pressurization vent)
// ───────────────────────────────────────────────────────────────

/// Vent readout and pressurization command.
pub trait VentPort {
    /// Chamber oxygen level in `[0, 1]`.
    fn oxygen_level(&self, vent: VentId) -> f32;

    /// `true` drives the chamber toward vacuum, `false` toward full pressure.
    fn set_depressurize(&mut self, vent: VentId, depressurize: bool);
}

// ───────────────────────────────────────────────────────────────
// Discovery port (domain ← block enumeration)
// ───────────────────────────────────────────────────────────────

/// A named door group found on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorGroupMatch {
    pub name: String,
    pub doors: Vec<DoorId>,
}

/// Block enumeration, used only by `reset`.
pub trait DiscoveryPort {
    /// Every door group whose name satisfies `name_matches`.
    fn door_groups(&self, name_matches: &dyn Fn(&str) -> bool) -> Vec<DoorGroupMatch>;

    /// Every vent whose name satisfies `name_matches`.
    fn vents(&self, name_matches: &dyn Fn(&str) -> bool) -> Vec<VentId>;

    /// Every display whose own configuration text satisfies `config_matches`.
    fn displays(&self, config_matches: &dyn Fn(&str) -> bool) -> Vec<DisplayId>;
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → info panels)
// ───────────────────────────────────────────────────────────────

/// Text output surfaces.  Content is informational only.
pub trait DisplayPort {
    fn write_text(&mut self, display: DisplayId, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / operator echo)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Combined gateway
// ───────────────────────────────────────────────────────────────

/// The actuator gateway a task step needs.
pub trait ActuatorGateway: DoorPort + VentPort {}

impl<T: DoorPort + VentPort + ?Sized> ActuatorGateway for T {}

/// Everything the service needs from the grid in one bound.  Passing a
/// single `&mut impl GridPort` avoids juggling several mutable borrows.
pub trait GridPort: ActuatorGateway + DiscoveryPort + DisplayPort {}

impl<T: DoorPort + VentPort + DiscoveryPort + DisplayPort + ?Sized> GridPort for T {}
