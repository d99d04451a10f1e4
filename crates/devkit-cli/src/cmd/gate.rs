use crate::output::print_json;
use anyhow::Context;
use devkit_core::config::{Config, SUMMARY_SCRIPT};
use devkit_core::gate::{run_gate, GateOutcome, ThresholdConfig};
use devkit_core::runner::ShellRunner;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let command = config.script(SUMMARY_SCRIPT)?;
    let thresholds = ThresholdConfig::from_env();

    if !json {
        println!("Running coding standards checks, this may take some time.");
    }
    let outcome = run_gate(&ShellRunner::new(root), command, thresholds)
        .context("failed to run coding standards summary")?;

    if json {
        let value = match &outcome {
            GateOutcome::Evaluated(report) => serde_json::json!({
                "passed": outcome.passed(),
                "summary": report.summary,
                "thresholds": report.thresholds,
            }),
            GateOutcome::Unparsable { reason, .. } => serde_json::json!({
                "passed": false,
                "error": reason.to_string(),
            }),
        };
        print_json(&value)?;
    } else {
        outcome.render(&mut std::io::stdout().lock())?;
    }

    Ok(outcome.exit_code())
}
