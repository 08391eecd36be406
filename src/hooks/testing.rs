//! Recording collaborators for hook tests.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::schema::GrubOptionsMap;
use crate::system::{ApplyError, LifecycleEvents, Setter, StageRunner, SystemApply};

#[derive(Debug, Default)]
pub(crate) struct RecordingApply {
    pub(crate) calls: Vec<Vec<Setter>>,
    pub(crate) fail: bool,
}

impl RecordingApply {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Options passed by the `call`th apply.
    pub(crate) fn grub_options(&self, call: usize) -> GrubOptionsMap {
        match self.calls[call].as_slice() {
            [Setter::GrubOptions(options)] => options.clone(),
            other => panic!("unexpected setters: {other:?}"),
        }
    }
}

impl SystemApply for RecordingApply {
    fn apply(&mut self, setters: Vec<Setter>) -> Result<(), ApplyError> {
        let names: Vec<String> = setters.iter().map(|s| s.name().to_string()).collect();
        self.calls.push(setters);
        if self.fail {
            return Err(ApplyError {
                failures: names
                    .into_iter()
                    .map(|name| (name, anyhow!("grubenv is read-only")))
                    .collect(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingStages {
    pub(crate) calls: Vec<String>,
    pub(crate) fail: bool,
}

impl RecordingStages {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl StageRunner for RecordingStages {
    fn run_stage(&mut self, stage: &str) -> Result<()> {
        self.calls.push(stage.to_string());
        if self.fail {
            return Err(anyhow!("stage '{stage}' failed"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingEvents {
    pub(crate) calls: Vec<PathBuf>,
    pub(crate) fail: bool,
}

impl RecordingEvents {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl LifecycleEvents for RecordingEvents {
    fn run_hook_script(&mut self, script: &Path) -> Result<()> {
        self.calls.push(script.to_path_buf());
        if self.fail {
            return Err(anyhow!("hook script '{}' failed", script.display()));
        }
        Ok(())
    }
}
