use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{run_command, ApplyError, Setter, SystemApply};
use crate::schema::GrubOptionsMap;

pub const DEFAULT_GRUBENV: &str = "/oem/grubenv";
pub const DEFAULT_GRUB_EDITENV: &str = "grub2-editenv";

/// Applies setters to a GRUB environment block through `grub2-editenv`.
#[derive(Debug, Clone)]
pub struct GrubEnv {
    /// `grub2-editenv` compatible binary.
    pub editenv: String,
    /// Environment block to modify.
    pub env_file: PathBuf,
}

impl Default for GrubEnv {
    fn default() -> Self {
        Self {
            editenv: DEFAULT_GRUB_EDITENV.to_string(),
            env_file: PathBuf::from(DEFAULT_GRUBENV),
        }
    }
}

impl GrubEnv {
    pub fn new(editenv: impl Into<String>, env_file: impl Into<PathBuf>) -> Self {
        Self {
            editenv: editenv.into(),
            env_file: env_file.into(),
        }
    }

    /// Arguments for a single `set` invocation covering every option.
    pub fn set_args(&self, options: &GrubOptionsMap) -> Vec<String> {
        let mut args = vec![self.env_file.display().to_string(), "set".to_string()];
        args.extend(options.iter().map(|(key, value)| format!("{key}={value}")));
        args
    }

    fn set_options(&self, options: &GrubOptionsMap) -> Result<()> {
        if options.is_empty() {
            tracing::debug!("no grub options to set");
            return Ok(());
        }
        run_command(&self.editenv, &self.set_args(options)).with_context(|| {
            format!(
                "setting {} grub option(s) in '{}'",
                options.len(),
                self.env_file.display()
            )
        })
    }
}

impl SystemApply for GrubEnv {
    fn apply(&mut self, setters: Vec<Setter>) -> Result<(), ApplyError> {
        let mut failures = Vec::new();
        for setter in setters {
            let result = match &setter {
                Setter::GrubOptions(options) => self.set_options(options),
            };
            if let Err(err) = result {
                failures.push((setter.name().to_string(), err));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ApplyError { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn options(pairs: &[(&str, &str)]) -> GrubOptionsMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn fake_editenv(dir: &TempDir) -> PathBuf {
        // appends its arguments to the env file so the test can inspect them
        let script = dir.path().join("editenv");
        fs::write(&script, "#!/bin/sh\nfile=\"$1\"\nshift\necho \"$@\" >> \"$file\"\n").unwrap();
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[test]
    fn test_set_args() {
        let env = GrubEnv::default();
        let args = env.set_args(&options(&[
            ("saved_entry", "1"),
            ("extra_cmdline", "console=ttyS0 quiet"),
        ]));
        assert_eq!(
            args,
            vec![
                "/oem/grubenv",
                "set",
                "extra_cmdline=console=ttyS0 quiet",
                "saved_entry=1",
            ]
        );
    }

    #[test]
    fn test_apply_writes_env() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("grubenv");
        let mut env = GrubEnv::new(fake_editenv(&temp).display().to_string(), &env_file);

        env.apply(vec![Setter::GrubOptions(options(&[("next_entry", "recovery")]))])
            .unwrap();

        let written = fs::read_to_string(&env_file).unwrap();
        assert_eq!(written.trim(), "set next_entry=recovery");
    }

    #[test]
    fn test_empty_options_skip_editenv() {
        let mut env = GrubEnv::new("definitely_not_a_real_command_12345", "/nonexistent");
        env.apply(vec![Setter::GrubOptions(GrubOptionsMap::new())])
            .unwrap();
    }

    #[test]
    fn test_apply_collects_failures() {
        let mut env = GrubEnv::new("false", "/nonexistent/grubenv");
        let err = env
            .apply(vec![
                Setter::GrubOptions(options(&[("saved_entry", "0")])),
                Setter::GrubOptions(options(&[("next_entry", "1")])),
            ])
            .unwrap_err();
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].0, "grub-options");
    }
}
