//! Boundary to the external extraction tool.
//!
//! Proprietary archive formats (RAR and friends) are never parsed here; an
//! external 7-Zip compatible binary unpacks them into a temporary directory
//! which the archive builder then repackages. The tool is an opaque
//! subprocess: this module only locates a working binary and checks its exit
//! status.

use std::path::Path;
use std::process::Stdio;

use log::{debug, info};
use tokio::process::Command;

use crate::error::{Error, Result};

/// Candidate extraction binaries, probed in priority order.
pub const DEFAULT_TOOL_CANDIDATES: &[&str] = &["7z", "7zz", "7za"];

/// Returns the first candidate that runs successfully on this system.
///
/// Tool absence is a fatal configuration error: callers must abort before
/// touching any file.
pub async fn find_extraction_tool(candidates: &[String]) -> Result<String> {
    for candidate in candidates {
        if tool_responds(candidate).await {
            info!("extraction tool found: {}", candidate);
            return Ok(candidate.clone());
        }
        debug!("extraction tool not available: {}", candidate);
    }
    Err(Error::ToolNotFound(candidates.join(", ")))
}

/// Checks whether invoking `command` with no arguments succeeds.
async fn tool_responds(command: &str) -> bool {
    Command::new(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Unpacks `archive` into `output_dir` using `tool`.
///
/// # Errors
///
/// `Error::ExternalTool` with the tool name, archive path and exit code when
/// the subprocess exits non-zero; `Error::Io` when it cannot be spawned.
pub async fn extract_archive(tool: &str, archive: &Path, output_dir: &Path) -> Result<()> {
    debug!("extracting {:?} into {:?}", archive, output_dir);

    let status = Command::new(tool)
        .arg("x")
        .arg(archive)
        .arg(format!("-o{}", output_dir.display()))
        .arg("-y")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::ExternalTool {
            tool: tool.to_string(),
            archive: archive.to_path_buf(),
            code: status.code(),
        })
    }
}
