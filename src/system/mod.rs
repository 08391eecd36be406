//! Collaborators that perform the side effects requested by hooks.
//!
//! Hooks never touch the host directly. They go through these traits so the
//! install pipeline can plug in the real implementations below, and tests can
//! plug in recording stubs.
//!
//! - [`SystemApply`] - applies a batch of option setters (GRUB environment)
//! - [`StageRunner`] - runs a named install stage
//! - [`LifecycleEvents`] - runs an optional lifecycle hook script

pub mod grubenv;
pub mod stages;

use std::fmt;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use thiserror::Error;

use crate::schema::GrubOptionsMap;

pub use grubenv::GrubEnv;
pub use stages::{ElementalStages, HookScripts};

/// A named option setter handed to [`SystemApply::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setter {
    /// Write the given options into the GRUB environment.
    GrubOptions(GrubOptionsMap),
}

impl Setter {
    pub fn name(&self) -> &'static str {
        match self {
            Setter::GrubOptions(_) => "grub-options",
        }
    }
}

impl fmt::Display for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregate failure of one or more setters.
#[derive(Debug, Error)]
#[error("{} setter(s) failed: {}", .failures.len(), summarize(.failures))]
pub struct ApplyError {
    pub failures: Vec<(String, anyhow::Error)>,
}

fn summarize(failures: &[(String, anyhow::Error)]) -> String {
    failures
        .iter()
        .map(|(setter, err)| format!("{setter}: {err:#}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub trait SystemApply {
    /// Apply every setter, collecting failures instead of stopping at the first.
    fn apply(&mut self, setters: Vec<Setter>) -> Result<(), ApplyError>;
}

pub trait StageRunner {
    fn run_stage(&mut self, stage: &str) -> Result<()>;
}

pub trait LifecycleEvents {
    /// Run the hook script at `script` if it exists.
    fn run_hook_script(&mut self, script: &Path) -> Result<()>;
}

/// Run a host command to completion, failing on a non-zero exit.
///
/// Output is captured and included in the error so a failed external call
/// can be reported without streaming to the console.
pub(crate) fn run_command(program: &str, args: &[String]) -> Result<()> {
    tracing::debug!(program, ?args, "running command");

    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("spawning '{program}'"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(program, stderr = %stderr.trim(), stdout = %stdout.trim(), "command failed");
        bail!(
            "'{}' exited with {}: {}",
            program,
            output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string()),
            stderr.trim()
        );
    }

    Ok(())
}
