use devkit_core::runner::CommandOutput;
use serde::Serialize;
use std::io::Write;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Replay a captured process's output on our own stdout/stderr.
pub fn echo(output: &CommandOutput) -> anyhow::Result<()> {
    std::io::stdout().write_all(output.stdout.as_bytes())?;
    std::io::stderr().write_all(output.stderr.as_bytes())?;
    Ok(())
}
