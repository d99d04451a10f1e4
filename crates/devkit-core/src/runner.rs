//! The process boundary.
//!
//! Everything devkit does outside its own process (git, phpcs, phpcbf,
//! parallel-lint, or a re-invocation of devkit itself) goes through a
//! [`CommandRunner`]. Core logic only ever sees a command name, its arguments
//! and the captured [`CommandOutput`], which keeps it testable with a fake.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{DevkitError, Result};

// ---------------------------------------------------------------------------
// CommandOutput
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code to propagate to our own caller. Signals map to 1.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }

    /// Stdout followed by stderr, trimmed.
    #[cfg(test)]
    pub(crate) fn combined(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        if stderr.is_empty() {
            stdout.to_string()
        } else if stdout.is_empty() {
            stderr.to_string()
        } else {
            format!("{stdout}\n{stderr}")
        }
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Run a named command with arguments and capture what it produced.
///
/// A non-zero exit is not an error: it is reported in [`CommandOutput::code`].
/// `Err` is reserved for commands that could not be started at all.
pub trait CommandRunner {
    fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput>;
}

// ---------------------------------------------------------------------------
// ShellRunner
// ---------------------------------------------------------------------------

/// Runs command lines through `sh -c` in a fixed working directory.
///
/// Arguments are never spliced into the command line. They are handed to the
/// shell as positional parameters and expanded with `"$@"`, so spaces and shell
/// metacharacters are not reinterpreted. The command itself still decides how
/// to parse them; an argument that looks like an option is read as one.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    cwd: PathBuf,
}

impl ShellRunner {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput> {
        if command.trim().is_empty() {
            return Err(DevkitError::CommandSpawn {
                command: command.to_string(),
                reason: "command is empty".to_string(),
            });
        }

        tracing::debug!(command, ?args, cwd = %self.cwd.display(), "spawning");

        let script = format!("{command} \"$@\"");
        let output = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .arg("sh")
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DevkitError::CommandSpawn {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(command, code = ?result.code, "finished");
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Records every invocation and replies with canned output per command.
    #[derive(Default)]
    pub(crate) struct FakeRunner {
        replies: HashMap<String, CommandOutput>,
        pub(crate) calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl FakeRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(mut self, command: &str, code: i32, stdout: &str) -> Self {
            self.replies.insert(
                command.to_string(),
                CommandOutput {
                    code: Some(code),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
            );
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput> {
            self.calls
                .borrow_mut()
                .push((command.to_string(), args.to_vec()));
            Ok(self.replies.get(command).cloned().unwrap_or(CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
