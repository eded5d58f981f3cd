//! Unified error types for the airlock controller.
//!
//! Only configuration resolution can fail.  Sequencer handlers and task
//! steps never return errors: a wait condition that is never satisfied is
//! a stall, not a fault.

use core::fmt;

use crate::app::ports::DoorId;
use crate::layout::Side;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `reset` could not build a configuration snapshot.
    Config(ConfigError),
    /// A previous `reset` failed; only another `reset` is accepted.
    Faulted(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Faulted(e) => write!(f, "halted after failed reset: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Raised only while resolving configuration text against the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration text is not valid TOML.
    Parse(String),
    /// A required string key is absent (or not a string).
    MissingKey(&'static str),
    /// An optional key is present but holds an unusable value.
    InvalidValue { key: &'static str, reason: &'static str },
    /// Zero or several door groups matched the tag.
    SingleGroupRequired { side: Side, tag: String, found: usize },
    /// Zero or several vents matched the tag.
    SingleVentRequired { tag: String, found: usize },
    /// A door was found in both the exterior and interior group.
    SharedDoor(DoorId),
    /// A group holds more doors than a [`DoorGroup`](crate::layout::DoorGroup) can track.
    GroupTooLarge { side: Side, count: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "configuration text unparsable: {msg}"),
            Self::MissingKey(key) => write!(f, "Key {key} is required in Custom Data"),
            Self::InvalidValue { key, reason } => write!(f, "Key {key} is invalid: {reason}"),
            Self::SingleGroupRequired { side, tag, found } => write!(
                f,
                "A single {side} airlock door group is required (found {found}). \
                 Its name must contain '{tag}'"
            ),
            Self::SingleVentRequired { tag, found } => write!(
                f,
                "A single airlock vent is required (found {found}). Its name must contain '{tag}'"
            ),
            Self::SharedDoor(door) => {
                write!(f, "door {door} belongs to both the exterior and interior group")
            }
            Self::GroupTooLarge { side, count } => write!(
                f,
                "{side} door group holds {count} doors, at most {} are supported",
                crate::layout::MAX_GROUP_DOORS
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
