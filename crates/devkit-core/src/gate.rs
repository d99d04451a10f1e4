//! Coding-standards threshold gate.
//!
//! phpcs is run with its summary report. The gate reads the totals line,
//! compares both counts with thresholds taken from the environment, and turns
//! the comparison into an exit code for CI.

use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::Result;
use crate::runner::CommandRunner;

pub const ERRORS_ENV: &str = "YOASTCS_THRESHOLD_ERRORS";
pub const WARNINGS_ENV: &str = "YOASTCS_THRESHOLD_WARNINGS";

/// Substring that identifies the phpcs totals line.
pub const SUMMARY_MARKER: &str = "A TOTAL OF";

const RULE: &str =
    "================================================================================";

// ---------------------------------------------------------------------------
// ThresholdConfig
// ---------------------------------------------------------------------------

/// Maximum number of errors and warnings that still pass the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThresholdConfig {
    pub errors: u64,
    pub warnings: u64,
}

impl ThresholdConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build thresholds from an arbitrary variable lookup.
    ///
    /// Unset, empty, negative or non-numeric values all become `0`, so by
    /// default any error or warning fails the gate.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            errors: parse_threshold(lookup(ERRORS_ENV)),
            warnings: parse_threshold(lookup(WARNINGS_ENV)),
        }
    }
}

fn parse_threshold(value: Option<String>) -> u64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// AnalysisSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("could not find a line containing \"A TOTAL OF\" in the coding standards output")]
    MarkerNotFound,

    #[error("could not read error and warning counts from: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub errors: u64,
    pub warnings: u64,
}

static TOTALS_RE: OnceLock<Regex> = OnceLock::new();

fn totals_re() -> &'static Regex {
    TOTALS_RE.get_or_init(|| {
        Regex::new(r"A TOTAL OF (\d+) ERRORS? AND (\d+) WARNINGS? WERE FOUND IN \d+ FILES?")
            .unwrap()
    })
}

impl AnalysisSummary {
    /// Extract the totals from phpcs summary output.
    ///
    /// Only the first line containing [`SUMMARY_MARKER`] is considered. If that
    /// line does not have the expected shape, later lines are not searched.
    pub fn parse(output: &str) -> std::result::Result<Self, SummaryError> {
        let line = output
            .lines()
            .find(|l| l.contains(SUMMARY_MARKER))
            .ok_or(SummaryError::MarkerNotFound)?;

        let malformed = || SummaryError::Malformed(line.trim().to_string());
        let caps = totals_re().captures(line).ok_or_else(malformed)?;
        let errors = caps[1].parse().map_err(|_| malformed())?;
        let warnings = caps[2].parse().map_err(|_| malformed())?;
        Ok(Self { errors, warnings })
    }
}

// ---------------------------------------------------------------------------
// GateReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub summary: AnalysisSummary,
    pub thresholds: ThresholdConfig,
    #[serde(skip)]
    pub raw_output: String,
}

impl GateReport {
    pub fn errors_exceeded(&self) -> bool {
        self.summary.errors > self.thresholds.errors
    }

    pub fn warnings_exceeded(&self) -> bool {
        self.summary.warnings > self.thresholds.warnings
    }

    pub fn above_threshold(&self) -> bool {
        self.errors_exceeded() || self.warnings_exceeded()
    }

    pub fn render(&self, out: &mut impl Write) -> std::io::Result<()> {
        let s = &self.summary;
        let t = &self.thresholds;

        write_banner(out, "SUMMARY")?;
        writeln!(out, "{}", self.raw_output.trim_end())?;
        writeln!(out)?;
        write_banner(out, "THRESHOLDS")?;
        writeln!(out, "Errors:   {}/{}", s.errors, t.errors)?;
        writeln!(out, "Warnings: {}/{}", s.warnings, t.warnings)?;
        writeln!(out)?;

        if self.errors_exceeded() {
            writeln!(
                out,
                "Coding standards errors are above the threshold ({} > {}). \
                 Fix the errors introduced in your changes; 'devkit check-branch-cs' lists them.",
                s.errors, t.errors
            )?;
        }
        if self.warnings_exceeded() {
            writeln!(
                out,
                "Coding standards warnings are above the threshold ({} > {}). \
                 Fix the warnings introduced in your changes; 'devkit check-branch-cs' lists them.",
                s.warnings, t.warnings
            )?;
        }
        if self.above_threshold() {
            return Ok(());
        }

        writeln!(out, "Coding standards checks passed!")?;
        if s.errors < t.errors {
            writeln!(
                out,
                "Found fewer errors than the threshold. Lower {ERRORS_ENV} to {}.",
                s.errors
            )?;
        }
        if s.warnings < t.warnings {
            writeln!(
                out,
                "Found fewer warnings than the threshold. Lower {WARNINGS_ENV} to {}.",
                s.warnings
            )?;
        }
        Ok(())
    }
}

fn write_banner(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "  {title}")?;
    writeln!(out, "{RULE}")
}

// ---------------------------------------------------------------------------
// GateOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Evaluated(GateReport),
    Unparsable {
        reason: SummaryError,
        raw_output: String,
    },
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, GateOutcome::Evaluated(r) if !r.above_threshold())
    }

    /// `0` when both counts are within their thresholds, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    pub fn render(&self, out: &mut impl Write) -> std::io::Result<()> {
        match self {
            GateOutcome::Evaluated(report) => report.render(out),
            GateOutcome::Unparsable { reason, raw_output } => {
                if !raw_output.trim().is_empty() {
                    writeln!(out, "{}", raw_output.trim_end())?;
                    writeln!(out)?;
                }
                writeln!(out, "Error: {reason}")
            }
        }
    }
}

/// Decide the gate from already captured analysis output.
pub fn evaluate(raw_output: String, thresholds: ThresholdConfig) -> GateOutcome {
    match AnalysisSummary::parse(&raw_output) {
        Ok(summary) => GateOutcome::Evaluated(GateReport {
            summary,
            thresholds,
            raw_output,
        }),
        Err(reason) => GateOutcome::Unparsable { reason, raw_output },
    }
}

/// Run the summary `command` once and decide the gate from its stdout.
///
/// The command's own exit status is ignored: phpcs exits non-zero whenever it
/// finds anything, and only the parsed counts decide.
pub fn run_gate(
    runner: &dyn CommandRunner,
    command: &str,
    thresholds: ThresholdConfig,
) -> Result<GateOutcome> {
    let output = runner.run(command, &[])?;
    let outcome = evaluate(output.stdout, thresholds);
    tracing::debug!(passed = outcome.passed(), "threshold gate evaluated");
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
