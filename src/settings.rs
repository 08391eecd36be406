use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::hooks::FailurePolicy;
use crate::system::grubenv::{DEFAULT_GRUBENV, DEFAULT_GRUB_EDITENV};
use crate::system::stages::DEFAULT_STAGE_RUNNER;

pub const DEFAULT_INSTALL_STAGE: &str = "kairos-install.after";
pub const DEFAULT_AFTER_INSTALL_SCRIPT: &str = "/usr/bin/kairos-agent.install.after.hook";

/// Host-side settings for the hooks and the collaborators they drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSettings {
    pub install_stage: String,
    pub after_install_script: PathBuf,
    pub stage_runner: String,
    pub grubenv: PathBuf,
    pub grub_editenv: String,
    pub failure_policy: FailurePolicy,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            install_stage: DEFAULT_INSTALL_STAGE.to_string(),
            after_install_script: PathBuf::from(DEFAULT_AFTER_INSTALL_SCRIPT),
            stage_runner: DEFAULT_STAGE_RUNNER.to_string(),
            grubenv: PathBuf::from(DEFAULT_GRUBENV),
            grub_editenv: DEFAULT_GRUB_EDITENV.to_string(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    hooks: Option<HooksToml>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HooksToml {
    install_stage: Option<String>,
    after_install_script: Option<String>,
    stage_runner: Option<String>,
    grubenv: Option<String>,
    grub_editenv: Option<String>,
    failure_policy: Option<String>,
}

pub fn load_settings(path: &Path) -> Result<HookSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading hook settings '{}'", path.display()))?;
    parse_settings(&raw, path)
}

fn parse_settings(raw: &str, path: &Path) -> Result<HookSettings> {
    let parsed: SettingsToml = toml::from_str(raw)
        .with_context(|| format!("parsing hook settings '{}'", path.display()))?;
    let hooks = parsed.hooks.unwrap_or_default();
    let defaults = HookSettings::default();

    let install_stage = non_empty(hooks.install_stage, "install_stage", path)?
        .unwrap_or(defaults.install_stage);
    let stage_runner = non_empty(hooks.stage_runner, "stage_runner", path)?
        .unwrap_or(defaults.stage_runner);
    let grub_editenv = non_empty(hooks.grub_editenv, "grub_editenv", path)?
        .unwrap_or(defaults.grub_editenv);

    let after_install_script = non_empty(hooks.after_install_script, "after_install_script", path)?
        .map(PathBuf::from)
        .unwrap_or(defaults.after_install_script);
    let grubenv = non_empty(hooks.grubenv, "grubenv", path)?
        .map(PathBuf::from)
        .unwrap_or(defaults.grubenv);

    let failure_policy = match hooks.failure_policy {
        Some(raw) => raw.parse::<FailurePolicy>().with_context(|| {
            format!("invalid hook settings '{}': failure_policy", path.display())
        })?,
        None => defaults.failure_policy,
    };

    Ok(HookSettings {
        install_stage,
        after_install_script,
        stage_runner,
        grubenv,
        grub_editenv,
        failure_policy,
    })
}

fn non_empty(value: Option<String>, field: &str, path: &Path) -> Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => bail!(
            "invalid hook settings '{}': {field} must not be empty",
            path.display()
        ),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_section_missing() {
        let settings = parse_settings("", Path::new("hooks.toml")).unwrap();
        assert_eq!(settings, HookSettings::default());
        assert_eq!(settings.install_stage, "kairos-install.after");
        assert_eq!(settings.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_load_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hooks.toml");
        std::fs::write(
            &path,
            r#"
[hooks]
install_stage = "custom-install.after"
grubenv = "/run/grubenv"
failure_policy = "escalate"
"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.install_stage, "custom-install.after");
        assert_eq!(settings.grubenv, PathBuf::from("/run/grubenv"));
        assert_eq!(settings.failure_policy, FailurePolicy::Escalate);
        assert_eq!(settings.grub_editenv, "grub2-editenv");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_settings("[hooks]\nretries = 3\n", Path::new("hooks.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("parsing hook settings"));
    }

    #[test]
    fn test_bad_policy_rejected() {
        let err = parse_settings("[hooks]\nfailure_policy = \"retry\"\n", Path::new("h.toml"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("retry"));
    }

    #[test]
    fn test_empty_value_rejected() {
        let err =
            parse_settings("[hooks]\ninstall_stage = \" \"\n", Path::new("h.toml")).unwrap_err();
        assert!(err.to_string().contains("install_stage must not be empty"));
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(load_settings(&temp.path().join("absent.toml")).is_err());
    }
}
