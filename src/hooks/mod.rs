//! Install-time hooks.
//!
//! A hook is a named action run at a fixed [`InstallStage`]. Every hook has
//! two entry points: [`Hook::run`] takes the legacy configuration and
//! [`Hook::run_schema`] takes the schema configuration. Given equivalent
//! input both produce the same side effects.
//!
//! # Failure handling
//!
//! Side effects (applying GRUB options, running a stage, running a hook
//! script) never fail a hook. Their errors are logged and recorded in the
//! returned [`HookReport`]; [`dispatch`] then decides what to do with them
//! according to a [`FailurePolicy`]. Only a [`HookError`] crosses the hook
//! boundary as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use install_hooks::hooks::{dispatch, hooks_for_stage, ConfigInput, FailurePolicy, HookEnv, InstallStage};
//!
//! let hooks = hooks_for_stage(InstallStage::PostInstall, &settings);
//! let mut env = HookEnv::new(&mut grubenv, &mut stages, &mut scripts);
//! let summary = dispatch(&hooks, ConfigInput::Schema(&config), &mut env, FailurePolicy::Continue)?;
//! ```

pub mod grub_options;
pub mod run_stage;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::{DispatchError, HookError};
use crate::legacy::LegacyConfig;
use crate::schema::SchemaConfig;
use crate::settings::HookSettings;
use crate::system::{LifecycleEvents, StageRunner, SystemApply};

pub use grub_options::{GrubOptions, GrubPostInstallOptions};
pub use run_stage::RunStage;

/// A named install-time action.
pub trait Hook {
    /// Name for logging and reports.
    fn name(&self) -> &str;

    /// Stage the hook belongs to.
    fn stage(&self) -> InstallStage;

    /// Run against the legacy configuration.
    fn run(&self, config: &LegacyConfig, env: &mut HookEnv<'_>) -> Result<HookReport, HookError>;

    /// Run against the schema configuration.
    fn run_schema(
        &self,
        config: &SchemaConfig,
        env: &mut HookEnv<'_>,
    ) -> Result<HookReport, HookError>;
}

/// Install stages at which hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstallStage {
    PreInstall,
    PostInstall,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStage::PreInstall => write!(f, "pre-install"),
            InstallStage::PostInstall => write!(f, "post-install"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown install stage '{0}' (expected 'pre-install' or 'post-install')")]
pub struct UnknownStage(String);

impl FromStr for InstallStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre-install" | "pre_install" => Ok(InstallStage::PreInstall),
            "post-install" | "post_install" => Ok(InstallStage::PostInstall),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

/// Collaborators a hook may call.
pub struct HookEnv<'a> {
    pub system: &'a mut dyn SystemApply,
    pub stages: &'a mut dyn StageRunner,
    pub events: &'a mut dyn LifecycleEvents,
}

impl<'a> HookEnv<'a> {
    pub fn new(
        system: &'a mut dyn SystemApply,
        stages: &'a mut dyn StageRunner,
        events: &'a mut dyn LifecycleEvents,
    ) -> Self {
        Self {
            system,
            stages,
            events,
        }
    }
}

/// Side effects a hook can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffect {
    ApplyGrubOptions,
    RunStage,
    RunHookScript,
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffect::ApplyGrubOptions => write!(f, "apply-grub-options"),
            SideEffect::RunStage => write!(f, "run-stage"),
            SideEffect::RunHookScript => write!(f, "run-hook-script"),
        }
    }
}

/// A side effect that failed without failing its hook.
#[derive(Debug)]
pub struct SideEffectFailure {
    pub effect: SideEffect,
    pub error: anyhow::Error,
}

/// Outcome of one successful hook invocation.
#[derive(Debug)]
pub struct HookReport {
    hook: String,
    failures: Vec<SideEffectFailure>,
}

impl HookReport {
    pub fn new(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            failures: Vec::new(),
        }
    }

    /// Record a failed side effect. The failure is logged here, once.
    pub fn record(&mut self, effect: SideEffect, error: anyhow::Error) {
        let message = format!("{error:#}");
        tracing::warn!(hook = %self.hook, %effect, error = %message, "side effect failed");
        self.failures.push(SideEffectFailure { effect, error });
    }

    pub fn hook(&self) -> &str {
        &self.hook
    }

    pub fn failures(&self) -> &[SideEffectFailure] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What [`dispatch`] does with recorded side-effect failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep running the remaining hooks.
    #[default]
    Continue,
    /// Stop after the first hook that recorded a failure.
    Abort,
    /// Stop and return the failures as an error.
    Escalate,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Continue => write!(f, "continue"),
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Escalate => write!(f, "escalate"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown failure policy '{0}' (expected 'continue', 'abort' or 'escalate')")]
pub struct UnknownPolicy(String);

impl FromStr for FailurePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(FailurePolicy::Continue),
            "abort" => Ok(FailurePolicy::Abort),
            "escalate" => Ok(FailurePolicy::Escalate),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Whichever configuration representation the call site has.
#[derive(Debug, Clone, Copy)]
pub enum ConfigInput<'a> {
    Legacy(&'a LegacyConfig),
    Schema(&'a SchemaConfig),
}

/// Reports of every hook that ran.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub reports: Vec<HookReport>,
    /// `true` when [`FailurePolicy::Abort`] skipped the remaining hooks.
    pub stopped_early: bool,
}

impl DispatchSummary {
    pub fn failure_count(&self) -> usize {
        self.reports.iter().map(|r| r.failures().len()).sum()
    }
}

/// Run `hooks` in order, one at a time.
pub fn dispatch(
    hooks: &[Box<dyn Hook>],
    input: ConfigInput<'_>,
    env: &mut HookEnv<'_>,
    policy: FailurePolicy,
) -> Result<DispatchSummary, DispatchError> {
    let mut summary = DispatchSummary::default();

    for (index, hook) in hooks.iter().enumerate() {
        tracing::info!(hook = hook.name(), stage = %hook.stage(), "running hook");
        let report = match input {
            ConfigInput::Legacy(config) => hook.run(config, env)?,
            ConfigInput::Schema(config) => hook.run_schema(config, env)?,
        };

        if report.is_clean() {
            summary.reports.push(report);
            continue;
        }

        match policy {
            FailurePolicy::Continue => summary.reports.push(report),
            FailurePolicy::Abort => {
                let skipped = hooks.len() - index - 1;
                tracing::warn!(hook = report.hook(), skipped, "aborting hook dispatch");
                summary.reports.push(report);
                summary.stopped_early = skipped > 0;
                break;
            }
            FailurePolicy::Escalate => return Err(DispatchError::SideEffects(report)),
        }
    }

    tracing::debug!(
        hooks = summary.reports.len(),
        failures = summary.failure_count(),
        "hook dispatch finished"
    );
    Ok(summary)
}

/// Hooks run at `stage`, in order.
pub fn hooks_for_stage(stage: InstallStage, settings: &HookSettings) -> Vec<Box<dyn Hook>> {
    match stage {
        InstallStage::PreInstall => vec![Box::new(GrubOptions)],
        InstallStage::PostInstall => vec![
            Box::new(GrubPostInstallOptions),
            Box::new(RunStage::from_settings(settings)),
        ],
    }
}
