use crate::error::{ReleaseBumpError, Result};
use crate::exec::{CommandRunner, Invocation};
use std::path::Path;
use std::process::Command;

/// Runs commands as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    /// Execute the invocation and wait for it.
    ///
    /// Any non-zero exit code is treated as a failure; captured stdout and stderr are
    /// included in the error.
    fn run(&self, invocation: &Invocation, work_dir: &Path) -> Result<()> {
        tracing::debug!(command = %invocation, dir = %work_dir.display(), "running command");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(work_dir)
            .output()
            .map_err(|e| {
                ReleaseBumpError::command(format!("Failed to execute {}: {}", invocation, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(ReleaseBumpError::command(format!(
                "{} failed with exit code {}\nStdout: {}\nStderr: {}",
                invocation,
                output.status.code().unwrap_or(-1),
                stdout.trim_end(),
                stderr.trim_end()
            )));
        }

        tracing::debug!(command = %invocation, "command succeeded");
        Ok(())
    }
}
