use crate::output::{echo, print_json};
use anyhow::Context;
use devkit_core::changes::{self, STAGED};
use devkit_core::config::{Config, LINT_SCRIPT};
use devkit_core::runner::ShellRunner;
use devkit_core::scoped::{run_scoped, ScopedOutcome};
use std::path::Path;

/// Which changes a scoped command looks at.
pub enum Scope {
    Staged,
    /// Changes against a reference; `None` means `vcs.base_branch`.
    Branch(Option<String>),
}

impl Scope {
    fn reference(self, config: &Config) -> String {
        match self {
            Scope::Staged => STAGED.to_string(),
            Scope::Branch(against) => against.unwrap_or_else(|| config.vcs.base_branch.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// changed-files
// ---------------------------------------------------------------------------

pub fn list(root: &Path, reference: &str, ext: Option<&str>, json: bool) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let extension = ext.unwrap_or(config.vcs.extension.as_str());
    let runner = ShellRunner::new(root);
    let files = changes::resolve(&runner, reference, extension)
        .with_context(|| format!("failed to list changes against '{reference}'"))?;

    if json {
        print_json(&files)?;
    } else {
        for path in files.iter() {
            println!("{path}");
        }
    }
    Ok(0)
}

// ---------------------------------------------------------------------------
// lint-* / check-*-cs
// ---------------------------------------------------------------------------

pub fn lint(root: &Path, scope: Scope) -> anyhow::Result<i32> {
    run_on_changes(root, scope, LINT_SCRIPT, "No files to lint.")
}

pub fn check_cs(root: &Path, scope: Scope) -> anyhow::Result<i32> {
    run_on_changes(root, scope, "check-cs-warnings", "No files to check.")
}

fn run_on_changes(root: &Path, scope: Scope, script: &str, nothing: &str) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let command = config.script(script)?;
    let reference = scope.reference(&config);
    let runner = ShellRunner::new(root);

    let files = changes::resolve(&runner, &reference, &config.vcs.extension)
        .with_context(|| format!("failed to list changes against '{reference}'"))?;

    let outcome = run_scoped(&runner, command, &files)
        .with_context(|| format!("failed to run script '{script}'"))?;
    match &outcome {
        ScopedOutcome::NothingToDo => println!("{nothing}"),
        ScopedOutcome::Ran(output) => echo(output)?,
    }
    Ok(outcome.exit_code())
}
