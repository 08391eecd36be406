//! Install-time configuration hooks.
//!
//! This crate applies machine-install configuration at fixed points of an
//! install run and validates the settings that drive it:
//!
//! - **Schema** - the install block, with power management validated as
//!   exactly one of three variants and typed GRUB options
//! - **Derivation** - flattening typed GRUB options into the key/value map
//!   the apply layer consumes
//! - **Hooks** - named actions with a legacy and a schema entry point, whose
//!   side-effect failures are recorded instead of aborting the install
//! - **System** - the collaborators hooks drive (GRUB environment, install
//!   stages, lifecycle hook scripts)
//!
//! # Architecture
//!
//! ```text
//! loader ──► LegacyConfig ─┐
//!        └─► SchemaConfig ─┤  (validated while deserializing)
//!                          ▼
//!           hooks::dispatch(hooks_for_stage(..), input, env, policy)
//!                          │
//!            ┌─────────────┼──────────────┐
//!            ▼             ▼              ▼
//!       SystemApply   StageRunner   LifecycleEvents
//!       (GrubEnv)     (elemental)   (HookScripts)
//! ```
//!
//! # Example
//!
//! ```rust
//! use install_hooks::schema::{GrubOptionsSchema, PowerManagement};
//!
//! let grub = GrubOptionsSchema {
//!     default_menu_entry: Some("Kairos".into()),
//!     ..Default::default()
//! };
//! let map = grub.to_options_map().unwrap();
//! assert_eq!(map["default_menu_entry"], "Kairos");
//!
//! assert!(PowerManagement::from_flags(true, true).is_err());
//! ```

pub mod error;
pub mod hooks;
pub mod legacy;
pub mod loader;
pub mod preflight;
pub mod schema;
pub mod settings;
pub mod system;

pub use error::{DerivationError, DispatchError, HookError, ValidationError};
pub use hooks::{
    dispatch, hooks_for_stage, ConfigInput, FailurePolicy, Hook, HookEnv, HookReport,
    InstallStage,
};
pub use legacy::LegacyConfig;
pub use schema::{GrubOptionsSchema, InstallSchema, PowerManagement, SchemaConfig};
pub use settings::HookSettings;
