use thiserror::Error;

use crate::hooks::HookReport;

/// A configuration value that can never be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "power management reboot={reboot} poweroff={poweroff} matches {matches} variants (expected exactly one)"
    )]
    PowerManagement {
        reboot: bool,
        poweroff: bool,
        matches: usize,
    },

    #[error("invalid install device '{0}' (expected 'auto', '/' or an absolute device path)")]
    Device(String),
}

/// Failure while flattening a typed options value into a key/value map.
#[derive(Debug, Error)]
pub enum DerivationError {
    #[error("serializing grub options: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("grub options did not serialize to a map")]
    NotAMap,

    #[error("grub option '{0}' is not a string")]
    NotAString(String),
}

/// Fatal error raised by a hook entry point.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook '{hook}': deriving grub options")]
    Derivation {
        hook: String,
        #[source]
        source: DerivationError,
    },
}

/// Error returned by [`crate::hooks::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("hook '{}' recorded {} failed side effect(s)", .0.hook(), .0.failures().len())]
    SideEffects(HookReport),
}
