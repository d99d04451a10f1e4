use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::error::Result;
use crate::runner::{CommandOutput, CommandRunner};

// ---------------------------------------------------------------------------
// ChoiceMenu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Choice {
    pub label: String,
    /// Name of the downstream command to invoke.
    pub command: String,
}

/// Keyed choices, iterated in ascending key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceMenu {
    choices: BTreeMap<String, Choice>,
}

impl ChoiceMenu {
    pub fn new() -> Self {
        Self {
            choices: BTreeMap::new(),
        }
    }

    pub fn with_choice(
        mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        self.choices.insert(
            key.into(),
            Choice {
                label: label.into(),
                command: command.into(),
            },
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&Choice> {
        self.choices.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Choice)> {
        self.choices.iter().map(|(k, c)| (k.as_str(), c))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.choices.len()
    }
}

/// The coding-standards menu.
impl Default for ChoiceMenu {
    fn default() -> Self {
        Self::new()
            .with_choice(
                "1",
                "Check staged files for coding standard warnings & errors.",
                "check-staged-cs",
            )
            .with_choice(
                "2",
                "Check current branch's changed files for coding standard warnings & errors.",
                "check-branch-cs",
            )
            .with_choice("3", "Check for all coding standard errors.", "check-cs")
            .with_choice(
                "4",
                "Check for all coding standard warnings & errors.",
                "check-cs-warnings",
            )
            .with_choice("5", "Fix auto-fixable coding standards.", "fix-cs")
            .with_choice(
                "6",
                "Verify coding standard violations are below thresholds.",
                "check-cs-thresholds",
            )
    }
}

// ---------------------------------------------------------------------------
// dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Invoked {
        key: String,
        command: String,
        output: CommandOutput,
    },
    UnknownChoice(String),
}

/// Invoke the command behind one menu choice.
///
/// With no `selection`, the menu is written to `out` and one line is read
/// from `input` as the key. At most one command is ever invoked.
pub fn dispatch(
    menu: &ChoiceMenu,
    selection: Option<&str>,
    input: &mut impl BufRead,
    out: &mut impl Write,
    runner: &dyn CommandRunner,
) -> Result<DispatchOutcome> {
    let key = match selection {
        Some(s) => s.trim().to_string(),
        None => prompt(menu, input, out)?,
    };

    let Some(choice) = menu.get(&key) else {
        tracing::debug!(key = %key, "unknown menu choice");
        return Ok(DispatchOutcome::UnknownChoice(key));
    };

    tracing::debug!(key = %key, command = %choice.command, "dispatching");
    let output = runner.run(&choice.command, &[])?;
    Ok(DispatchOutcome::Invoked {
        key,
        command: choice.command.clone(),
        output,
    })
}

fn prompt(menu: &ChoiceMenu, input: &mut impl BufRead, out: &mut impl Write) -> Result<String> {
    for (key, choice) in menu.iter() {
        writeln!(out, "{key}. {}", choice.label)?;
    }
    write!(out, "Choose an option: ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
