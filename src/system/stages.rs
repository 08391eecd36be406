use std::path::Path;

use anyhow::{bail, Context, Result};

use super::{run_command, LifecycleEvents, StageRunner};

pub const DEFAULT_STAGE_RUNNER: &str = "elemental";

/// Runs install stages with `elemental run-stage <stage>`.
#[derive(Debug, Clone)]
pub struct ElementalStages {
    pub binary: String,
}

impl Default for ElementalStages {
    fn default() -> Self {
        Self {
            binary: DEFAULT_STAGE_RUNNER.to_string(),
        }
    }
}

impl StageRunner for ElementalStages {
    fn run_stage(&mut self, stage: &str) -> Result<()> {
        if stage.trim().is_empty() {
            bail!("stage name is empty");
        }
        let args = vec!["run-stage".to_string(), stage.to_string()];
        run_command(&self.binary, &args).with_context(|| format!("running stage '{stage}'"))
    }
}

/// Runs lifecycle hook scripts found on the host. A missing script is not an error.
#[derive(Debug, Clone, Default)]
pub struct HookScripts;

impl LifecycleEvents for HookScripts {
    fn run_hook_script(&mut self, script: &Path) -> Result<()> {
        if !script.is_file() {
            tracing::debug!(script = %script.display(), "no hook script, skipping");
            return Ok(());
        }
        let program = script.display().to_string();
        run_command(&program, &[])
            .with_context(|| format!("running hook script '{}'", script.display()))
    }
}
