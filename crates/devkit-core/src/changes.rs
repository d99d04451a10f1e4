use serde::Serialize;

use crate::error::{DevkitError, Result};
use crate::runner::CommandRunner;

/// `git diff` restricted to names of files that still exist (`d` excludes deletions).
///
/// Paths come back unquoted and relative to the working directory, so they can
/// be handed straight to a linter running there.
pub const GIT_DIFF_COMMAND: &str =
    "git -c core.quotePath=false diff --name-only --relative --diff-filter=d";

/// Reference that compares the index against HEAD instead of a branch.
pub const STAGED: &str = "--staged";

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// Changed paths, in diff order, all ending with one extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    paths: Vec<String>,
}

impl ChangeSet {
    /// Keep the lines of `raw` whose suffix is exactly `extension`.
    ///
    /// The match is case-sensitive and literal: `.php` keeps `a.php` and
    /// drops `a.PHP` and `a.phpt`.
    pub fn from_diff_output(raw: &str, extension: &str) -> Self {
        let paths = raw
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty() && l.ends_with(extension))
            .map(str::to_string)
            .collect();
        Self { paths }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.paths
    }

}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

/// List files changed relative to `reference`, filtered to `extension`.
///
/// Git failures are not retried. A non-zero exit leaves whatever stdout git
/// produced (normally nothing), so a bad reference reads as "no files".
/// A reference starting with `-` (other than [`STAGED`]) is rejected before
/// git sees it.
pub fn resolve(runner: &dyn CommandRunner, reference: &str, extension: &str) -> Result<ChangeSet> {
    if reference.starts_with('-') && reference != STAGED {
        return Err(DevkitError::InvalidReference(reference.to_string()));
    }
    let output = runner.run(GIT_DIFF_COMMAND, &[reference.to_string()])?;
    if !output.success() {
        tracing::warn!(
            reference,
            code = ?output.code,
            stderr = output.stderr.trim(),
            "git diff failed; treating as no changed files"
        );
    }
    let changes = ChangeSet::from_diff_output(&output.stdout, extension);
    tracing::debug!(reference, extension, count = changes.len(), "resolved change set");
    Ok(changes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;
    use crate::runner::ShellRunner;
    use tempfile::TempDir;

    const DIFF: &str = "src/a.php\nsrc/b.js\n\nREADME.md\nsrc/c.PHP\ntests/d.phpt\nsrc/e.php\r\nlib/f.php\n";

    #[test]
    fn keeps_only_exact_suffix_in_order() {
        let changes = ChangeSet::from_diff_output(DIFF, ".php");
        assert_eq!(changes.as_slice(), ["src/a.php", "src/e.php", "lib/f.php"]);
    }

    #[test]
    fn every_path_ends_with_extension() {
        for ext in [".php", ".js", ".md", ".phpt", "php", ".rs"] {
            let changes = ChangeSet::from_diff_output(DIFF, ext);
            assert!(
                changes.iter().all(|p| p.ends_with(ext)),
                "extension {ext}: {changes:?}"
            );
        }
    }

    #[test]
    fn empty_output_is_empty_set() {
        let changes = ChangeSet::from_diff_output("", ".php");
        assert!(changes.is_empty());
        assert_eq!(changes.len(), 0);
    }

    #[test]
    fn serializes_as_plain_array() {
        let changes = ChangeSet::from_diff_output("a.php\nb.php\n", ".php");
        let json = serde_json::to_string(&changes).unwrap();
        assert_eq!(json, r#"["a.php","b.php"]"#);
    }

    #[test]
    fn resolve_passes_reference_as_argument() {
        let runner = FakeRunner::new().reply(GIT_DIFF_COMMAND, 0, "a.php\nb.js\n");
        let changes = resolve(&runner, "trunk", ".php").unwrap();
        assert_eq!(changes.as_slice(), ["a.php"]);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, GIT_DIFF_COMMAND);
        assert_eq!(calls[0].1, vec!["trunk".to_string()]);
    }

    #[test]
    fn option_like_reference_is_rejected() {
        let runner = FakeRunner::new().reply(GIT_DIFF_COMMAND, 0, "a.php\n");
        let err = resolve(&runner, "--output=x", ".php").unwrap_err();
        assert!(matches!(err, DevkitError::InvalidReference(ref r) if r == "--output=x"));
        assert_eq!(runner.call_count(), 0);

        assert!(resolve(&runner, STAGED, ".php").is_ok());
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn git_failure_reads_as_no_files() {
        let runner = FakeRunner::new().reply(GIT_DIFF_COMMAND, 128, "");
        let changes = resolve(&runner, "no-such-branch", ".php").unwrap();
        assert!(changes.is_empty());
        assert_eq!(runner.call_count(), 1);
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn init_repo(dir: &TempDir) -> ShellRunner {
        let runner = ShellRunner::new(dir.path());
        let setup = "git init -q . \
            && git config user.email dev@example.com \
            && git config user.name dev \
            && printf 'a' > a.php && printf 'b' > b.js && printf 'c' > c.php \
            && git add . \
            && git -c commit.gpgsign=false commit -qm init";
        let out = runner.run(setup, &[]).unwrap();
        assert!(out.success(), "git setup failed: {}", out.combined());
        runner
    }

    #[test]
    fn resolve_against_real_repo_excludes_deletions() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let runner = init_repo(&dir);
        let edit = "printf 'x' >> a.php && printf 'y' >> b.js && git rm -q c.php";
        assert!(runner.run(edit, &[]).unwrap().success());

        let changes = resolve(&runner, "HEAD", ".php").unwrap();
        assert_eq!(changes.as_slice(), ["a.php"]);
    }

    #[test]
    fn resolve_staged_only_sees_index() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let runner = init_repo(&dir);
        let edit = "printf 'x' >> a.php && printf 'z' >> c.php && git add a.php";
        assert!(runner.run(edit, &[]).unwrap().success());

        let changes = resolve(&runner, STAGED, ".php").unwrap();
        assert_eq!(changes.as_slice(), ["a.php"]);
    }

    #[test]
    fn resolve_is_idempotent() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let runner = init_repo(&dir);
        assert!(runner
            .run("printf 'x' >> a.php && printf 'z' >> c.php", &[])
            .unwrap()
            .success());

        let first = resolve(&runner, "HEAD", ".php").unwrap();
        let second = resolve(&runner, "HEAD", ".php").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn resolve_keeps_non_ascii_paths() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let runner = init_repo(&dir);
        let setup = "printf 'x' > café.php && git add café.php \
            && git -c commit.gpgsign=false commit -qm accent \
            && printf 'y' >> café.php && printf 'y' >> a.php";
        assert!(runner.run(setup, &[]).unwrap().success());

        let changes = resolve(&runner, "HEAD", ".php").unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|p| p == "café.php"), "{changes:?}");
        assert!(changes.iter().any(|p| p == "a.php"), "{changes:?}");
    }

    #[test]
    fn resolve_is_relative_to_subdirectory_root() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let top = init_repo(&dir);
        let setup = "mkdir plugin && printf 'p' > plugin/p.php && git add plugin \
            && git -c commit.gpgsign=false commit -qm plugin \
            && printf 'x' >> plugin/p.php && printf 'x' >> a.php";
        assert!(top.run(setup, &[]).unwrap().success());

        let plugin = dir.path().join("plugin");
        let changes = resolve(&ShellRunner::new(&plugin), "HEAD", ".php").unwrap();
        assert_eq!(changes.as_slice(), ["p.php"]);
        assert!(changes.iter().all(|p| plugin.join(p).exists()));
    }
}
