use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DerivationError;

/// Flat boot-loader options as handed to the apply layer.
///
/// Absent keys mean "leave unset", never "set to empty".
pub type GrubOptionsMap = BTreeMap<String, String>;

/// Typed GRUB options block.
///
/// Field names on the wire are the option names written to the GRUB
/// environment. Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrubOptionsSchema {
    /// Sets default fallback logic.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub default_fallback: Option<String>,
    /// Change the GRUB menu entry.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub default_menu_entry: Option<String>,
    /// Additional kernel cmdline applied only to the active system.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub extra_active_cmdline: Option<String>,
    /// Additional kernel cmdline.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub extra_cmdline: Option<String>,
    /// Additional kernel cmdline applied only to the passive system.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub extra_passive_cmdline: Option<String>,
    /// Additional boot commands when booting into recovery.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub extra_recovery_cmdline: Option<String>,
    /// Next reboot entry.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub next_entry: Option<String>,
    /// Default boot entry.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub saved_entry: Option<String>,
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl GrubOptionsSchema {
    /// Derive the flat options map.
    ///
    /// Keys come from the serialized field names, so renaming a field on
    /// the wire renames it here too. Unset fields are left out of the map.
    pub fn to_options_map(&self) -> Result<GrubOptionsMap, DerivationError> {
        options_map_from_value(serde_json::to_value(self)?)
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.default_fallback,
            &self.default_menu_entry,
            &self.extra_active_cmdline,
            &self.extra_cmdline,
            &self.extra_passive_cmdline,
            &self.extra_recovery_cmdline,
            &self.next_entry,
            &self.saved_entry,
        ]
        .into_iter()
        .all(is_unset)
    }
}

fn options_map_from_value(value: Value) -> Result<GrubOptionsMap, DerivationError> {
    let Value::Object(fields) = value else {
        return Err(DerivationError::NotAMap);
    };

    let mut options = GrubOptionsMap::new();
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            Value::String(s) => {
                options.insert(key, s);
            }
            _ => return Err(DerivationError::NotAString(key)),
        }
    }
    Ok(options)
}
