//! Shell command helper for recipes

use std::process::Command;

use anyhow::{bail, Context, Result};

/// Run `command` through `sh -c`, echoing the line first the way make
/// does. A non-zero exit becomes an error carrying the status and the
/// command text.
pub fn sh(command: &str) -> Result<()> {
    println!("{command}");
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .with_context(|| format!("Failed to spawn shell for: {command}"))?;
    if !status.success() {
        bail!("Command failed with {status}: {command}");
    }
    Ok(())
}
