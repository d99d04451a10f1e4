use crate::output::echo;
use anyhow::Context;
use devkit_core::config::Config;
use devkit_core::runner::{CommandRunner, ShellRunner};
use std::path::Path;

/// Run the script `name` with `args`, replay its output, and exit with its status.
pub fn run(root: &Path, name: &str, args: &[String]) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let command = config.script(name)?;
    let output = ShellRunner::new(root)
        .run(command, args)
        .with_context(|| format!("failed to run script '{name}'"))?;
    echo(&output)?;
    Ok(output.exit_code())
}
