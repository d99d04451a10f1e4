use crate::changes::ChangeSet;
use crate::error::Result;
use crate::runner::{CommandOutput, CommandRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedOutcome {
    /// The change set was empty; nothing was run.
    NothingToDo,
    Ran(CommandOutput),
}

impl ScopedOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            ScopedOutcome::NothingToDo => 0,
            ScopedOutcome::Ran(output) => output.exit_code(),
        }
    }
}

/// Run `command` once with every path in `changes` as arguments.
pub fn run_scoped(
    runner: &dyn CommandRunner,
    command: &str,
    changes: &ChangeSet,
) -> Result<ScopedOutcome> {
    if changes.is_empty() {
        return Ok(ScopedOutcome::NothingToDo);
    }
    tracing::debug!(command, files = changes.len(), "running on changed files");
    let output = runner.run(command, changes.as_slice())?;
    Ok(ScopedOutcome::Ran(output))
}
