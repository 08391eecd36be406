//! Schema representation of the install configuration.
//!
//! Everything here is validated while it is deserialized: a
//! [`SchemaConfig`] that exists has a single power management variant and a
//! well-formed install device.

pub mod grub;
pub mod power;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DerivationError, ValidationError};

pub use grub::{GrubOptionsMap, GrubOptionsSchema};
pub use power::{PowerAny, PowerManagement};

/// Schema configuration as handed to the hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub install: InstallSchema,
    /// Boot-loader options applied after installation.
    #[serde(default, skip_serializing_if = "GrubOptionsSchema::is_empty")]
    pub grub_options: GrubOptionsSchema,
}

impl SchemaConfig {
    /// Options applied by the pre-install boot-loader hook.
    pub fn grub_options(&self) -> Result<GrubOptionsMap, DerivationError> {
        self.install.grub_options()
    }

    /// Options applied by the post-install boot-loader hook.
    pub fn post_install_grub_options(&self) -> Result<GrubOptionsMap, DerivationError> {
        self.grub_options.to_options_map()
    }
}

/// The install block. Drives automatic installations without user interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallSchema {
    /// Install without pairing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bind_mounts: Vec<String>,
    /// Bundles added at runtime.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<Bundle>,
    /// Device for automated installs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ephemeral_mounts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub encrypted_partitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "GrubOptionsSchema::is_empty")]
    pub grub_options: GrubOptionsSchema,
    /// Container image used for the installation instead of the running one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// `reboot` / `poweroff`, flattened into the install block.
    #[serde(flatten)]
    pub power_management: PowerManagement,
    #[serde(
        default,
        rename = "skip_copy_kcrypt_plugin",
        skip_serializing_if = "is_false"
    )]
    pub skip_encrypt_copy_plugins: bool,
}

impl InstallSchema {
    pub fn grub_options(&self) -> Result<GrubOptionsMap, DerivationError> {
        self.grub_options.to_options_map()
    }

    pub fn power(&self) -> PowerAny {
        self.power_management.power()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A bundle installed into the target system at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs_path: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub local_file: bool,
}

/// Install target device: `auto`, `/`, or an absolute path such as `/dev/sda`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Device(String);

impl Device {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw == "auto" || raw == "/" {
            return Ok(Self(raw.to_string()));
        }

        let Some(rest) = raw.strip_prefix('/') else {
            return Err(ValidationError::Device(raw.to_string()));
        };
        let well_formed = rest.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });
        if !well_formed {
            return Err(ValidationError::Device(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0 == "auto"
    }
}

impl TryFrom<String> for Device {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Device::parse(&value)
    }
}

impl From<Device> for String {
    fn from(value: Device) -> Self {
        value.0
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
