//! Legacy configuration representation.
//!
//! Boot-loader options are kept as the flat map the user wrote, so nothing
//! has to be derived before they are applied. This representation is not
//! validated; it is accepted as-is while callers move over to
//! [`crate::schema::SchemaConfig`].

use serde::{Deserialize, Serialize};

use crate::schema::GrubOptionsMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConfig {
    #[serde(default)]
    pub install: LegacyInstall,
    /// Boot-loader options applied after installation.
    #[serde(default, skip_serializing_if = "GrubOptionsMap::is_empty")]
    pub grub_options: GrubOptionsMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyInstall {
    #[serde(default)]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub reboot: bool,
    #[serde(default)]
    pub poweroff: bool,
    /// Boot-loader options applied before installation.
    #[serde(default, skip_serializing_if = "GrubOptionsMap::is_empty")]
    pub grub_options: GrubOptionsMap,
}
