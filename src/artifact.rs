//! Plain-text version artifact

use crate::domain::Version;
use crate::error::{ReleaseBumpError, Result};
use crate::exec::{CommandRunner, Invocation};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of the version artifact for `version`
pub fn artifact_contents(version: &Version) -> String {
    format!("{}\n", version)
}

/// Write `<version>\n` to `path` (relative to `work_dir`) and stage it.
///
/// Does nothing when `path` is `None`.
///
/// # Returns
/// * `Ok(Some(path))` - The artifact was written and staged
/// * `Ok(None)` - No artifact configured
/// * `Err` - Writing or staging failed
pub fn write_version_artifact<R: CommandRunner>(
    path: Option<&Path>,
    version: &Version,
    stage_command: &[String],
    runner: &R,
    work_dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let target = work_dir.join(path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, artifact_contents(version)).map_err(|e| {
        ReleaseBumpError::command(format!(
            "Failed to write version file {}: {}",
            target.display(),
            e
        ))
    })?;
    tracing::info!(path = %path.display(), %version, "wrote version file");

    let invocation =
        Invocation::from_template(stage_command, &[])?.arg(path.to_string_lossy().into_owned());
    runner.run(&invocation, work_dir)?;

    Ok(Some(path.to_path_buf()))
}
