use std::path::PathBuf;

use tracing::instrument;

use super::{Hook, HookEnv, HookReport, InstallStage, SideEffect};
use crate::error::HookError;
use crate::legacy::LegacyConfig;
use crate::schema::SchemaConfig;
use crate::settings::{HookSettings, DEFAULT_AFTER_INSTALL_SCRIPT, DEFAULT_INSTALL_STAGE};

/// Runs the after-install stage and then the after-install hook script.
///
/// Nothing is read from the configuration. The two actions are independent:
/// a failing stage does not prevent the script from running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStage {
    pub stage: String,
    pub script: PathBuf,
}

impl Default for RunStage {
    fn default() -> Self {
        Self {
            stage: DEFAULT_INSTALL_STAGE.to_string(),
            script: PathBuf::from(DEFAULT_AFTER_INSTALL_SCRIPT),
        }
    }
}

impl RunStage {
    pub fn from_settings(settings: &HookSettings) -> Self {
        Self {
            stage: settings.install_stage.clone(),
            script: settings.after_install_script.clone(),
        }
    }

    fn fire(&self, env: &mut HookEnv<'_>) -> HookReport {
        let mut report = HookReport::new(self.name());

        if let Err(err) = env.stages.run_stage(&self.stage) {
            report.record(SideEffect::RunStage, err);
        }
        if let Err(err) = env.events.run_hook_script(&self.script) {
            report.record(SideEffect::RunHookScript, err);
        }
        report
    }
}

impl Hook for RunStage {
    fn name(&self) -> &str {
        "run-stage"
    }

    fn stage(&self) -> InstallStage {
        InstallStage::PostInstall
    }

    #[instrument(skip_all, fields(hook = "run-stage", stage = %self.stage))]
    fn run(&self, _config: &LegacyConfig, env: &mut HookEnv<'_>) -> Result<HookReport, HookError> {
        Ok(self.fire(env))
    }

    #[instrument(skip_all, fields(hook = "run-stage", stage = %self.stage))]
    fn run_schema(
        &self,
        _config: &SchemaConfig,
        env: &mut HookEnv<'_>,
    ) -> Result<HookReport, HookError> {
        Ok(self.fire(env))
    }
}
