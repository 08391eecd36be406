use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use install_hooks::hooks::{dispatch, hooks_for_stage, ConfigInput, HookEnv, InstallStage};
use install_hooks::loader::{load_legacy_config, load_schema_config};
use install_hooks::settings::{load_settings, HookSettings};
use install_hooks::system::{ElementalStages, GrubEnv, HookScripts};

fn usage() -> &'static str {
    "Usage:\n  install-hooks validate <config>\n  install-hooks grub-options <config>\n  install-hooks run <pre-install|post-install> <config> [--legacy] [--settings <file>]"
}

fn main() -> Result<()> {
    install_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [validate, config] if validate == "validate" => validate_config(Path::new(config)),
        [grub, config] if grub == "grub-options" => print_grub_options(Path::new(config)),
        [run, stage, config, rest @ ..] if run == "run" => {
            let options = parse_run_options(rest)?;
            run_stage(stage, Path::new(config), &options)
        }
        _ => bail!(usage()),
    }
}

#[derive(Debug, Default)]
struct RunOptions {
    legacy: bool,
    settings: Option<PathBuf>,
}

fn parse_run_options(args: &[String]) -> Result<RunOptions> {
    let mut options = RunOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--legacy" => options.legacy = true,
            "--settings" => {
                let path = iter
                    .next()
                    .with_context(|| format!("--settings requires a path\n{}", usage()))?;
                options.settings = Some(PathBuf::from(path));
            }
            other => bail!("unexpected argument '{}'\n{}", other, usage()),
        }
    }
    Ok(options)
}

fn validate_config(path: &Path) -> Result<()> {
    let config = load_schema_config(path)?;
    let install = &config.install;
    println!("power management: {}", install.power_management);
    if let Some(device) = &install.device {
        println!("device: {device}");
    }
    Ok(())
}

fn print_grub_options(path: &Path) -> Result<()> {
    let config = load_schema_config(path)?;
    let options = config
        .grub_options()
        .with_context(|| format!("deriving grub options from '{}'", path.display()))?;
    let rendered =
        serde_json::to_string_pretty(&options).context("rendering grub options as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn run_stage(stage: &str, config_path: &Path, options: &RunOptions) -> Result<()> {
    let stage: InstallStage = stage.parse()?;
    let settings = match &options.settings {
        Some(path) => load_settings(path)?,
        None => HookSettings::default(),
    };

    let hooks = hooks_for_stage(stage, &settings);
    let mut grubenv = GrubEnv::new(settings.grub_editenv.clone(), settings.grubenv.clone());
    let mut stages = ElementalStages {
        binary: settings.stage_runner.clone(),
    };
    let mut scripts = HookScripts;
    let mut env = HookEnv::new(&mut grubenv, &mut stages, &mut scripts);

    let summary = if options.legacy {
        let config = load_legacy_config(config_path)?;
        dispatch(&hooks, ConfigInput::Legacy(&config), &mut env, settings.failure_policy)
    } else {
        let config = load_schema_config(config_path)?;
        dispatch(&hooks, ConfigInput::Schema(&config), &mut env, settings.failure_policy)
    }
    .with_context(|| format!("running {stage} hooks"))?;

    tracing::info!(
        %stage,
        hooks = summary.reports.len(),
        failures = summary.failure_count(),
        stopped_early = summary.stopped_early,
        "stage hooks finished"
    );
    Ok(())
}

fn install_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
