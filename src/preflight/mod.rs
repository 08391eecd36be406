//! Preflight checks for hook execution.
//!
//! Validates that the host has the tools the collaborators shell out to
//! before an install stage runs, so a missing binary is reported up front
//! instead of as a recorded side-effect failure.
//!
//! # Example
//!
//! ```rust
//! use install_hooks::preflight::{check_required_tools, command_exists};
//!
//! if !command_exists("grub2-editenv") {
//!     println!("grub2 tools not installed");
//! }
//!
//! let tools = &[("elemental", "elemental-cli")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Result};

use crate::settings::HookSettings;

/// Check if a command exists on the host system.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Check that specific tools are available.
///
/// # Arguments
///
/// * `tools` - Slice of (command, package) tuples
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` with list of missing tools and their packages
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<_> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .collect();

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Check the tools the configured collaborators invoke.
pub fn check_hook_tools(settings: &HookSettings) -> Result<()> {
    check_required_tools(&[
        (settings.grub_editenv.as_str(), "grub2"),
        (settings.stage_runner.as_str(), "elemental-cli"),
    ])
}
