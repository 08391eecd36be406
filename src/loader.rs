//! Reading configuration documents from disk.
//!
//! Documents are YAML (cloud-config style) or JSON, picked by extension.
//! Schema validation happens while deserializing, so a document asking for
//! both a reboot and a power-off fails here, before any hook runs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::legacy::LegacyConfig;
use crate::schema::SchemaConfig;

pub fn load_schema_config(path: &Path) -> Result<SchemaConfig> {
    load_document(path).with_context(|| format!("loading install schema '{}'", path.display()))
}

pub fn load_legacy_config(path: &Path) -> Result<LegacyConfig> {
    load_document(path).with_context(|| format!("loading legacy config '{}'", path.display()))
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&raw).context("parsing JSON")
    } else {
        serde_yaml::from_str(&raw).context("parsing YAML")
    }
}
