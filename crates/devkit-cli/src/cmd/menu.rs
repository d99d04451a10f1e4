use anyhow::Context;
use devkit_core::config::{Config, BUILTIN_COMMANDS};
use devkit_core::menu::{dispatch, DispatchOutcome};
use devkit_core::runner::{CommandOutput, CommandRunner};
use devkit_core::DevkitError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs menu commands by re-invoking this executable.
///
/// Built-in names become subcommands (`devkit check-cs`), anything else is
/// treated as a script (`devkit script <name>`). Stdio is inherited, so the
/// captured output is always empty.
struct SubcommandRunner {
    exe: PathBuf,
    root: PathBuf,
}

impl CommandRunner for SubcommandRunner {
    fn run(&self, command: &str, args: &[String]) -> devkit_core::Result<CommandOutput> {
        let mut cmd = Command::new(&self.exe);
        cmd.arg("--root").arg(&self.root);
        if BUILTIN_COMMANDS.contains(&command) {
            cmd.arg(command);
        } else {
            cmd.args(["script", command]);
        }
        cmd.args(args);

        tracing::debug!(command, "invoking devkit subcommand");
        let status = cmd.status().map_err(|e| DevkitError::CommandSpawn {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        Ok(CommandOutput {
            code: status.code(),
            ..CommandOutput::default()
        })
    }
}

pub fn run(root: &Path, choice: Option<&str>) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let runner = SubcommandRunner {
        exe: std::env::current_exe().context("failed to locate the devkit executable")?,
        root: root.to_path_buf(),
    };

    let stdin = std::io::stdin();
    let outcome = dispatch(
        &config.menu,
        choice,
        &mut stdin.lock(),
        &mut std::io::stdout().lock(),
        &runner,
    )?;

    match outcome {
        DispatchOutcome::Invoked { output, .. } => Ok(output.exit_code()),
        DispatchOutcome::UnknownChoice(key) => {
            println!("Unknown choice: {key}");
            Ok(0)
        }
    }
}
