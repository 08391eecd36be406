//! Power management after installation.
//!
//! The install block carries two flags, `reboot` and `poweroff`, which are
//! not compatible with each other. Each accepted combination is described by
//! a [`PowerShape`] and exactly one shape must match for a document to be
//! valid. The result is a [`PowerManagement`] value, so a configuration that
//! asks for both a reboot and a power-off cannot be represented.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Validated power management intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PowerAny", into = "PowerAny")]
pub enum PowerManagement {
    /// Neither reboot nor power off after installation.
    #[default]
    NoPowerManagement,
    /// Reboot after installation.
    RebootOnly,
    /// Power off after installation.
    PowerOffOnly,
}

/// Constraint placed on one boolean field by a [`PowerShape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// The field may hold any value.
    Any,
    /// The field must hold exactly this value.
    Const(bool),
}

impl FieldRule {
    fn admits(self, value: bool) -> bool {
        match self {
            FieldRule::Any => true,
            FieldRule::Const(expected) => expected == value,
        }
    }
}

/// Field-level constraints of one power management variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerShape {
    pub variant: PowerManagement,
    pub reboot: FieldRule,
    pub poweroff: FieldRule,
}

impl PowerShape {
    /// Returns `true` when every field constraint is satisfied.
    pub fn matches(&self, flags: PowerAny) -> bool {
        self.reboot.admits(flags.reboot) && self.poweroff.admits(flags.poweroff)
    }
}

/// The variants a power management block may take. Exactly one must match.
pub const POWER_SHAPES: &[PowerShape] = &[
    PowerShape {
        variant: PowerManagement::NoPowerManagement,
        reboot: FieldRule::Const(false),
        poweroff: FieldRule::Const(false),
    },
    PowerShape {
        variant: PowerManagement::RebootOnly,
        reboot: FieldRule::Const(true),
        poweroff: FieldRule::Const(false),
    },
    PowerShape {
        variant: PowerManagement::PowerOffOnly,
        reboot: FieldRule::Const(false),
        poweroff: FieldRule::Const(true),
    },
];

/// Flat `{reboot, poweroff}` view.
///
/// This is also the wire shape of the power fields. On its own it carries no
/// validation guarantee; go through [`PowerManagement`] for that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerAny {
    #[serde(default, skip_serializing_if = "is_false")]
    pub reboot: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub poweroff: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PowerManagement {
    /// Select the single variant matching `reboot` and `poweroff`.
    pub fn from_flags(reboot: bool, poweroff: bool) -> Result<Self, ValidationError> {
        select_variant(POWER_SHAPES, PowerAny { reboot, poweroff })
    }

    pub fn power(self) -> PowerAny {
        match self {
            PowerManagement::NoPowerManagement => PowerAny::default(),
            PowerManagement::RebootOnly => PowerAny {
                reboot: true,
                poweroff: false,
            },
            PowerManagement::PowerOffOnly => PowerAny {
                reboot: false,
                poweroff: true,
            },
        }
    }

    pub fn reboot(self) -> bool {
        self == PowerManagement::RebootOnly
    }

    pub fn poweroff(self) -> bool {
        self == PowerManagement::PowerOffOnly
    }
}

/// Exactly-one-of check over an arbitrary variant table.
pub fn select_variant(
    shapes: &[PowerShape],
    flags: PowerAny,
) -> Result<PowerManagement, ValidationError> {
    let matching: Vec<&PowerShape> = shapes.iter().filter(|shape| shape.matches(flags)).collect();

    match matching.as_slice() {
        [only] => Ok(only.variant),
        _ => Err(ValidationError::PowerManagement {
            reboot: flags.reboot,
            poweroff: flags.poweroff,
            matches: matching.len(),
        }),
    }
}

impl TryFrom<PowerAny> for PowerManagement {
    type Error = ValidationError;

    fn try_from(flags: PowerAny) -> Result<Self, Self::Error> {
        PowerManagement::from_flags(flags.reboot, flags.poweroff)
    }
}

impl From<PowerManagement> for PowerAny {
    fn from(value: PowerManagement) -> Self {
        value.power()
    }
}

impl fmt::Display for PowerManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerManagement::NoPowerManagement => write!(f, "NoPowerManagement"),
            PowerManagement::RebootOnly => write!(f, "RebootOnly"),
            PowerManagement::PowerOffOnly => write!(f, "PowerOffOnly"),
        }
    }
}
