//! Inbound commands to the airlock service.
//!
//! The host hands the service one text argument per invocation.  The first
//! non-switch token selects the handler, case-insensitively; switches
//! (`-x`, `--name`) and further tokens are ignored.

use core::fmt;
use core::str::FromStr;

/// Named events the sequencer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AirlockCommand {
    /// Reload configuration and rediscover blocks.
    Reset,
    InteriorEnter,
    InteriorExit,
    AirlockEnter,
    AirlockExit,
    ExteriorEnter,
    ExteriorExit,
    /// Manually drive the interior group through one full motion.
    ToggleInterior,
    /// Manually drive the exterior group through one full motion.
    ToggleExterior,
}

impl AirlockCommand {
    pub const ALL: [Self; 9] = [
        Self::Reset,
        Self::InteriorEnter,
        Self::InteriorExit,
        Self::AirlockEnter,
        Self::AirlockExit,
        Self::ExteriorEnter,
        Self::ExteriorExit,
        Self::ToggleInterior,
        Self::ToggleExterior,
    ];

    /// The token that selects this command.
    pub fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::InteriorEnter => "interior_enter",
            Self::InteriorExit => "interior_exit",
            Self::AirlockEnter => "airlock_enter",
            Self::AirlockExit => "airlock_exit",
            Self::ExteriorEnter => "exterior_enter",
            Self::ExteriorExit => "exterior_exit",
            Self::ToggleInterior => "toggle_interior",
            Self::ToggleExterior => "toggle_exterior",
        }
    }
}

impl fmt::Display for AirlockCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token that names no command.  Carries the lower-cased token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid Argument: {}", self.0)
    }
}

impl FromStr for AirlockCommand {
    type Err = UnknownCommand;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let lower = token.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == lower)
            .ok_or(UnknownCommand(lower))
    }
}

/// First positional token of a command line, with surrounding quotes
/// stripped.  `None` when the line has no positional token.
pub fn first_argument(line: &str) -> Option<&str> {
    line.split_whitespace()
        .find(|tok| !tok.starts_with('-'))
        .map(|tok| tok.trim_matches('"'))
        .filter(|tok| !tok.is_empty())
}

/// Parse a full command line.  `Ok(None)` for an empty line.
pub fn parse_line(line: &str) -> Result<Option<AirlockCommand>, UnknownCommand> {
    first_argument(line)
        .map(str::parse::<AirlockCommand>)
        .transpose()
}

// ───────────────────────────────────────────────────────────────
// Update source
// ───────────────────────────────────────────────────────────────

/// Why the host invoked the service.  Several reasons can coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSource(u8);

impl UpdateSource {
    pub const NONE: Self = Self(0);
    /// Operator ran the program by hand.
    pub const TERMINAL: Self = Self(0b0000_0001);
    /// A sensor or button fired with an argument.
    pub const TRIGGER: Self = Self(0b0000_0010);
    /// The resume tick the service asked for.
    pub const ONCE: Self = Self(0b0000_0100);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for UpdateSource {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
