//! Path utilities shared by the planner and the archive builder.

use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Converts a path to a string with fallback to lossy conversion.
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Gets the file name from a path with fallback to lossy conversion.
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Computes the archive-internal name for `file`, which must live under
/// `base`: the relative path from `base` to `file`, joined with forward
/// slashes regardless of host path conventions.
pub fn relative_archive_name(base: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(base).map_err(|_| {
        Error::InvalidPath(
            file.to_path_buf(),
            format!("not located under '{}'", base.display()),
        )
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        return Err(Error::InvalidPath(
            file.to_path_buf(),
            "relative archive name is empty".to_string(),
        ));
    }

    Ok(parts.join("/"))
}
