//! Airlock configuration text.
//!
//! The controller's own configuration text is a TOML document:
//!
//! ```toml
//! [Airlock]
//! AirVentTag = "Airlock Vent"
//! ExteriorDoorsTag = "Airlock Exterior"
//! InteriorDoorsTag = "Airlock Interior"
//! WaitTimeoutTicks = 600   # optional; absent = wait forever
//! ```
//!
//! Display blocks carry their own text; a display takes part when that
//! text contains an `[InfoDisplay]` table.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Table holding the airlock keys.
pub const AIRLOCK_SECTION: &str = "Airlock";
/// Table marking a display as an information panel.
pub const INFO_SECTION: &str = "InfoDisplay";

pub const AIR_VENT_TAG_KEY: &str = "AirVentTag";
pub const EXTERIOR_DOORS_TAG_KEY: &str = "ExteriorDoorsTag";
pub const INTERIOR_DOORS_TAG_KEY: &str = "InteriorDoorsTag";
pub const WAIT_TIMEOUT_KEY: &str = "WaitTimeoutTicks";

/// Parsed airlock settings.  Immutable between resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlockSettings {
    /// Name fragment identifying the single airlock vent.
    pub air_vent_tag: String,
    /// Name fragment identifying the single exterior door group.
    pub exterior_doors_tag: String,
    /// Name fragment identifying the single interior door group.
    pub interior_doors_tag: String,
    /// Max consecutive ticks a task may spend at one wait point.
    /// `None` waits forever.
    pub wait_budget_ticks: Option<u32>,
}

// Raw document shape.  Values stay untyped so a wrongly-typed key can be
// reported as missing rather than as a parse failure of the whole text.
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(rename = "Airlock", default)]
    airlock: Option<RawAirlockSection>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAirlockSection {
    #[serde(rename = "AirVentTag", default)]
    air_vent_tag: Option<toml::Value>,
    #[serde(rename = "ExteriorDoorsTag", default)]
    exterior_doors_tag: Option<toml::Value>,
    #[serde(rename = "InteriorDoorsTag", default)]
    interior_doors_tag: Option<toml::Value>,
    #[serde(rename = "WaitTimeoutTicks", default)]
    wait_timeout_ticks: Option<toml::Value>,
}

impl AirlockSettings {
    /// Parse the controller's configuration text.
    ///
    /// Required keys are checked in a fixed order and the first missing one
    /// is reported.  Nothing outside the `[Airlock]` table is inspected.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let doc: RawDocument =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.message().to_string()))?;
        let section = doc.airlock.unwrap_or_default();

        let air_vent_tag = required_string(section.air_vent_tag, AIR_VENT_TAG_KEY)?;
        let exterior_doors_tag =
            required_string(section.exterior_doors_tag, EXTERIOR_DOORS_TAG_KEY)?;
        let interior_doors_tag =
            required_string(section.interior_doors_tag, INTERIOR_DOORS_TAG_KEY)?;

        let wait_budget_ticks = match section.wait_timeout_ticks {
            None => None,
            Some(toml::Value::Integer(n)) if n > 0 => {
                Some(u32::try_from(n).map_err(|_| ConfigError::InvalidValue {
                    key: WAIT_TIMEOUT_KEY,
                    reason: "exceeds u32 range",
                })?)
            }
            Some(toml::Value::Integer(_)) => {
                return Err(ConfigError::InvalidValue {
                    key: WAIT_TIMEOUT_KEY,
                    reason: "must be a positive tick count",
                });
            }
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    key: WAIT_TIMEOUT_KEY,
                    reason: "must be an integer",
                });
            }
        };

        Ok(Self {
            air_vent_tag,
            exterior_doors_tag,
            interior_doors_tag,
            wait_budget_ticks,
        })
    }
}

fn required_string(value: Option<toml::Value>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(toml::Value::String(s)) => Ok(s),
        _ => Err(ConfigError::MissingKey(key)),
    }
}

/// Whether `text` parses and declares a top-level `[section]` table.
/// Unparsable text simply does not qualify.
pub fn has_section(text: &str, section: &str) -> bool {
    text.parse::<toml::Table>()
        .map(|table| matches!(table.get(section), Some(toml::Value::Table(_))))
        .unwrap_or(false)
}
