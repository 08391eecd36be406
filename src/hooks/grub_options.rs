//! Boot-loader option hooks.
//!
//! A failure to apply options is recorded, never returned: a bad GRUB
//! environment must not abort the install. A failure to derive the options
//! from the schema is returned, since applying a partial map would silently
//! drop boot options.

use tracing::instrument;

use super::{Hook, HookEnv, HookReport, InstallStage, SideEffect};
use crate::error::{DerivationError, HookError};
use crate::legacy::LegacyConfig;
use crate::schema::{GrubOptionsMap, SchemaConfig};
use crate::system::Setter;

/// Applies `install.grub_options` before installation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrubOptions;

impl Hook for GrubOptions {
    fn name(&self) -> &str {
        "grub-options"
    }

    fn stage(&self) -> InstallStage {
        InstallStage::PreInstall
    }

    #[instrument(skip_all, fields(hook = "grub-options"))]
    fn run(&self, config: &LegacyConfig, env: &mut HookEnv<'_>) -> Result<HookReport, HookError> {
        Ok(apply_grub_options(
            self.name(),
            config.install.grub_options.clone(),
            env,
        ))
    }

    #[instrument(skip_all, fields(hook = "grub-options"))]
    fn run_schema(
        &self,
        config: &SchemaConfig,
        env: &mut HookEnv<'_>,
    ) -> Result<HookReport, HookError> {
        apply_derived(self.name(), config.grub_options(), env)
    }
}

/// Applies the top-level `grub_options` after installation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrubPostInstallOptions;

impl Hook for GrubPostInstallOptions {
    fn name(&self) -> &str {
        "grub-post-install-options"
    }

    fn stage(&self) -> InstallStage {
        InstallStage::PostInstall
    }

    #[instrument(skip_all, fields(hook = "grub-post-install-options"))]
    fn run(&self, config: &LegacyConfig, env: &mut HookEnv<'_>) -> Result<HookReport, HookError> {
        Ok(apply_grub_options(
            self.name(),
            config.grub_options.clone(),
            env,
        ))
    }

    #[instrument(skip_all, fields(hook = "grub-post-install-options"))]
    fn run_schema(
        &self,
        config: &SchemaConfig,
        env: &mut HookEnv<'_>,
    ) -> Result<HookReport, HookError> {
        apply_derived(self.name(), config.post_install_grub_options(), env)
    }
}

fn apply_derived(
    hook: &str,
    derived: Result<GrubOptionsMap, DerivationError>,
    env: &mut HookEnv<'_>,
) -> Result<HookReport, HookError> {
    let options = derived.map_err(|source| HookError::Derivation {
        hook: hook.to_string(),
        source,
    })?;
    Ok(apply_grub_options(hook, options, env))
}

fn apply_grub_options(hook: &str, options: GrubOptionsMap, env: &mut HookEnv<'_>) -> HookReport {
    let mut report = HookReport::new(hook);
    tracing::debug!(options = options.len(), "applying grub options");

    if let Err(err) = env.system.apply(vec![Setter::GrubOptions(options)]) {
        report.record(SideEffect::ApplyGrubOptions, err.into());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::super::testing::{RecordingApply, RecordingEvents, RecordingStages};
    use super::*;
    use crate::schema::GrubOptionsSchema;

    fn schema_config() -> SchemaConfig {
        let mut config = SchemaConfig::default();
        config.install.grub_options = GrubOptionsSchema {
            default_menu_entry: Some("Kairos".to_string()),
            extra_cmdline: Some(String::new()),
            ..Default::default()
        };
        config.grub_options.saved_entry = Some("1".to_string());
        config
    }

    fn legacy_config() -> LegacyConfig {
        let mut config = LegacyConfig::default();
        config
            .install
            .grub_options
            .insert("default_menu_entry".to_string(), "Kairos".to_string());
        config
            .grub_options
            .insert("saved_entry".to_string(), "1".to_string());
        config
    }

    #[test]
    fn test_both_entry_points_apply_the_same_options() {
        for hook in [&GrubOptions as &dyn Hook, &GrubPostInstallOptions] {
            let mut legacy_system = RecordingApply::default();
            let mut schema_system = RecordingApply::default();
            let mut stages = RecordingStages::default();
            let mut events = RecordingEvents::default();

            let mut env = HookEnv::new(&mut legacy_system, &mut stages, &mut events);
            let report = hook.run(&legacy_config(), &mut env).unwrap();
            assert!(report.is_clean());

            let mut env = HookEnv::new(&mut schema_system, &mut stages, &mut events);
            let report = hook.run_schema(&schema_config(), &mut env).unwrap();
            assert!(report.is_clean());

            assert_eq!(legacy_system.calls, schema_system.calls, "{}", hook.name());
            assert!(stages.calls.is_empty());
            assert!(events.calls.is_empty());
        }
    }

    #[test]
    fn test_pre_install_uses_install_block() {
        let mut system = RecordingApply::default();
        let mut stages = RecordingStages::default();
        let mut events = RecordingEvents::default();
        let mut env = HookEnv::new(&mut system, &mut stages, &mut events);

        GrubOptions.run_schema(&schema_config(), &mut env).unwrap();

        let applied = system.grub_options(0);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied["default_menu_entry"], "Kairos");
    }

    #[test]
    fn test_apply_failure_is_recorded_not_returned() {
        let mut stages = RecordingStages::default();
        let mut events = RecordingEvents::default();

        let mut system = RecordingApply::failing();
        let mut env = HookEnv::new(&mut system, &mut stages, &mut events);
        let report = GrubOptions.run(&legacy_config(), &mut env).unwrap();
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].effect, SideEffect::ApplyGrubOptions);
        assert_eq!(system.calls.len(), 1);

        let mut system = RecordingApply::failing();
        let mut env = HookEnv::new(&mut system, &mut stages, &mut events);
        let report = GrubOptions.run_schema(&schema_config(), &mut env).unwrap();
        assert_eq!(report.failures().len(), 1);
        assert!(report.failures()[0]
            .error
            .to_string()
            .contains("grubenv is read-only"));
        assert_eq!(system.calls.len(), 1);
    }

    #[test]
    fn test_derivation_failure_is_returned() {
        let mut system = RecordingApply::default();
        let mut stages = RecordingStages::default();
        let mut events = RecordingEvents::default();
        let mut env = HookEnv::new(&mut system, &mut stages, &mut events);

        let err = apply_derived("grub-options", Err(DerivationError::NotAMap), &mut env)
            .unwrap_err();

        assert!(matches!(
            &err,
            HookError::Derivation { hook, source: DerivationError::NotAMap } if hook == "grub-options"
        ));
        assert_eq!(err.to_string(), "hook 'grub-options': deriving grub options");
        assert!(system.calls.is_empty());
    }

    #[test]
    fn test_legacy_map_forwarded_unchanged() {
        let mut config = LegacyConfig::default();
        config
            .grub_options
            .insert("saved_entry".to_string(), "1".to_string());

        let mut system = RecordingApply::default();
        let mut stages = RecordingStages::default();
        let mut events = RecordingEvents::default();
        let mut env = HookEnv::new(&mut system, &mut stages, &mut events);

        GrubPostInstallOptions.run(&config, &mut env).unwrap();

        assert_eq!(system.calls.len(), 1);
        assert_eq!(system.grub_options(0), config.grub_options);
    }
}
