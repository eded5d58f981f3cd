//! Configuration snapshot: which blocks play which airlock role.
//!
//! [`resolve`] is pure with respect to the controller: it reads the
//! settings and queries the grid, and either returns a complete
//! [`AirlockLayout`] or a [`ConfigError`].  There is no partially valid
//! layout.

use core::fmt;

use heapless::Vec as FixedVec;
use log::info;
use serde::Serialize;

use crate::app::ports::{DiscoveryPort, DisplayId, DoorGroupMatch, DoorId, VentId};
use crate::config::{self, AirlockSettings};
use crate::error::ConfigError;

/// Maximum doors tracked per group (stack-allocated).
pub const MAX_GROUP_DOORS: usize = 16;

// ---------------------------------------------------------------------------
// Airlock side
// ---------------------------------------------------------------------------

/// One of the two boundaries of the airlock chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// Pressurized habitat side.
    Interior,
    /// Vacuum side.
    Exterior,
}

impl Side {
    /// Vent command that equalizes the chamber with this side.
    pub fn depressurize(self) -> bool {
        matches!(self, Self::Exterior)
    }

    /// Whether `oxygen_level` means the chamber matches this side.
    pub fn is_equalized(self, oxygen_level: f32) -> bool {
        match self {
            Self::Interior => oxygen_level >= 1.0,
            Self::Exterior => oxygen_level <= 0.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interior => write!(f, "interior"),
            Self::Exterior => write!(f, "exterior"),
        }
    }
}

// ---------------------------------------------------------------------------
// Door group
// ---------------------------------------------------------------------------

/// A resolved door group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DoorGroup {
    name: String,
    doors: FixedVec<DoorId, MAX_GROUP_DOORS>,
}

impl DoorGroup {
    pub(crate) fn from_match(side: Side, found: DoorGroupMatch) -> Result<Self, ConfigError> {
        let count = found.doors.len();
        let doors = FixedVec::from_slice(&found.doors)
            .map_err(|()| ConfigError::GroupTooLarge { side, count })?;
        Ok(Self {
            name: found.name,
            doors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doors(&self) -> &[DoorId] {
        &self.doors
    }

    /// The door whose ratio stands in for the whole group.
    pub fn representative(&self) -> Option<DoorId> {
        self.doors.first().copied()
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    pub fn contains(&self, door: DoorId) -> bool {
        self.doors.contains(&door)
    }
}

// ---------------------------------------------------------------------------
// Layout snapshot
// ---------------------------------------------------------------------------

/// Immutable role assignment produced by a successful `reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct AirlockLayout {
    pub settings: AirlockSettings,
    pub exterior: DoorGroup,
    pub interior: DoorGroup,
    pub vent: VentId,
    pub displays: Vec<DisplayId>,
}

impl AirlockLayout {
    pub fn group(&self, side: Side) -> &DoorGroup {
        match side {
            Side::Interior => &self.interior,
            Side::Exterior => &self.exterior,
        }
    }

    /// Exterior doors followed by interior doors.
    pub fn all_doors(&self) -> impl Iterator<Item = DoorId> + '_ {
        self.exterior
            .doors()
            .iter()
            .chain(self.interior.doors())
            .copied()
    }
}

/// Build a layout from configuration text.
///
/// Every required key is validated before the grid is queried.
pub fn resolve(config_text: &str, grid: &impl DiscoveryPort) -> Result<AirlockLayout, ConfigError> {
    let settings = AirlockSettings::parse(config_text)?;
    resolve_settings(settings, grid)
}

/// Resolve already-parsed settings against the grid.
pub fn resolve_settings(
    settings: AirlockSettings,
    grid: &impl DiscoveryPort,
) -> Result<AirlockLayout, ConfigError> {
    let displays = grid.displays(&|text| config::has_section(text, config::INFO_SECTION));

    let exterior = single_group(grid, Side::Exterior, &settings.exterior_doors_tag)?;
    let interior = single_group(grid, Side::Interior, &settings.interior_doors_tag)?;

    if let Some(shared) = exterior.doors().iter().find(|d| interior.contains(**d)) {
        return Err(ConfigError::SharedDoor(*shared));
    }

    let tag = settings.air_vent_tag.as_str();
    let vents = grid.vents(&|name| name.contains(tag));
    let vent = match vents.as_slice() {
        [vent] => *vent,
        _ => {
            return Err(ConfigError::SingleVentRequired {
                tag: settings.air_vent_tag.clone(),
                found: vents.len(),
            });
        }
    };

    info!(
        "Layout: exterior '{}' ({} doors), interior '{}' ({} doors), {} info displays",
        exterior.name(),
        exterior.len(),
        interior.name(),
        interior.len(),
        displays.len()
    );

    Ok(AirlockLayout {
        settings,
        exterior,
        interior,
        vent,
        displays,
    })
}

fn single_group(
    grid: &impl DiscoveryPort,
    side: Side,
    tag: &str,
) -> Result<DoorGroup, ConfigError> {
    let mut groups = grid.door_groups(&|name| name.contains(tag));
    if groups.len() != 1 {
        return Err(ConfigError::SingleGroupRequired {
            side,
            tag: tag.to_string(),
            found: groups.len(),
        });
    }
    DoorGroup::from_match(side, groups.remove(0))
}
