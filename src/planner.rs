//! Job planning: enumerating source units and deriving their destinations.
//!
//! Planning is read-only. It lists only the immediate children of a source
//! root (recursion happens later, inside each job's archive build), applies
//! the naming rule to each qualifying child, and returns jobs sorted by raw
//! source name bytes so repeated runs over unchanged input produce the same
//! job list in the same order. The sort is byte-wise and therefore
//! ASCII-ordinal: `"B"` sorts before `"a"`.

use std::path::{Path, PathBuf};

use log::debug;
use tokio::fs;

use crate::error::{Error, Result};
use crate::naming::{self, NamingRule};
use crate::types::ConversionJob;

/// A glob-like mask over immediate file names, used by the archive workflow.
///
/// Recognized shapes, most specific first: an exact name, `prefix*`,
/// `*suffix`, and `*substring*` (true substring containment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMask {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl FileMask {
    /// Parses a mask string. A mask with no `*` is an exact name; `*` only
    /// carries meaning at the ends of the mask.
    pub fn parse(mask: &str) -> Self {
        let starts = mask.starts_with('*');
        let ends = mask.len() > 1 && mask.ends_with('*');

        match (starts, ends) {
            (true, true) => FileMask::Contains(mask[1..mask.len() - 1].to_string()),
            (true, false) => FileMask::Suffix(mask[1..].to_string()),
            (false, true) => FileMask::Prefix(mask[..mask.len() - 1].to_string()),
            (false, false) => FileMask::Exact(mask.to_string()),
        }
    }

    /// Returns true if `name` matches this mask.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            FileMask::Exact(exact) => name == exact,
            FileMask::Prefix(prefix) => name.starts_with(prefix.as_str()),
            FileMask::Suffix(suffix) => name.ends_with(suffix.as_str()),
            FileMask::Contains(substring) => name.contains(substring.as_str()),
        }
    }
}

/// Plans one job per immediate subdirectory of `source_root`.
///
/// Jobs come back sorted by source name, ascending, with destinations under
/// `destination_root`. Children excluded by a match-only rule are simply
/// absent from the result.
///
/// # Errors
///
/// * `Error::NotFound` / `Error::InvalidPath` if the source root is missing
///   or not a directory.
/// * `Error::MalformedRule` if the rule rewrites a name to the empty string;
///   an empty destination name must never reach the builder.
pub async fn plan_directory_jobs(
    source_root: &Path,
    destination_root: &Path,
    rule: Option<&NamingRule>,
) -> Result<Vec<ConversionJob>> {
    let names = list_immediate_children(source_root, true).await?;

    let mut jobs = Vec::with_capacity(names.len());
    for source_name in names {
        let Some(destination_name) = naming::derive_destination_name(&source_name, rule) else {
            debug!("excluded by match-only rule: {}", source_name);
            continue;
        };
        if destination_name.is_empty() {
            return Err(Error::MalformedRule(format!(
                "rule produces an empty destination name for '{}'",
                source_name
            )));
        }

        jobs.push(ConversionJob {
            source_path: source_root.join(&source_name),
            destination_path: destination_root.join(&destination_name),
            source_name,
            destination_name,
        });
    }

    debug!("planned {} directory job(s)", jobs.len());
    Ok(jobs)
}

/// Plans one job per immediate file matching the mask embedded in
/// `masked_path` (e.g. `downloads/*.rar`).
///
/// When `destination` is a directory (or absent, defaulting to the masked
/// path's own directory), each match becomes `<stem>.cbz` inside it. When
/// `destination` names a file, it is only valid for a single match.
pub async fn plan_archive_jobs(
    masked_path: &Path,
    destination: Option<&Path>,
) -> Result<Vec<ConversionJob>> {
    let mask = masked_path
        .file_name()
        .map(|n| FileMask::parse(&n.to_string_lossy()))
        .ok_or_else(|| {
            Error::InvalidPath(
                masked_path.to_path_buf(),
                "masked path has no file name component".to_string(),
            )
        })?;
    let source_dir = match masked_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let names = list_immediate_children(&source_dir, false).await?;
    let matched: Vec<String> = names.into_iter().filter(|n| mask.matches(n)).collect();

    let destination_dir = match destination {
        None => source_dir.clone(),
        Some(path) if path.is_dir() => path.to_path_buf(),
        Some(path) => {
            // Destination names a single output file.
            if matched.len() > 1 {
                return Err(Error::InvalidPath(
                    path.to_path_buf(),
                    format!(
                        "destination is a single file but the mask matched {} sources",
                        matched.len()
                    ),
                ));
            }
            let Some(source_name) = matched.into_iter().next() else {
                return Ok(Vec::new());
            };
            let destination_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_name.clone());
            return Ok(vec![ConversionJob {
                source_path: source_dir.join(&source_name),
                destination_path: path.to_path_buf(),
                source_name,
                destination_name,
            }]);
        }
    };

    let jobs = matched
        .into_iter()
        .map(|source_name| {
            let stem = Path::new(&source_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_name.clone());
            let destination_name = format!("{}{}", stem, naming::DEFAULT_ARCHIVE_SUFFIX);
            ConversionJob {
                source_path: source_dir.join(&source_name),
                destination_path: destination_dir.join(&destination_name),
                source_name,
                destination_name,
            }
        })
        .collect::<Vec<_>>();

    debug!("planned {} archive job(s)", jobs.len());
    Ok(jobs)
}

/// Lists the immediate children of `root`, filtered to directories or files,
/// returned sorted by raw name bytes. Read-only.
async fn list_immediate_children(root: &Path, directories: bool) -> Result<Vec<String>> {
    let metadata = fs::metadata(root)
        .await
        .map_err(|_| Error::NotFound(format!("Source root does not exist: {:?}", root)))?;
    if !metadata.is_dir() {
        return Err(Error::InvalidPath(
            root.to_path_buf(),
            "Source root is not a directory".to_string(),
        ));
    }

    let mut listing = fs::read_dir(root).await.map_err(|e| Error::Planning {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut names = Vec::new();
    while let Some(entry) = listing.next_entry().await.map_err(|e| Error::Planning {
        path: root.to_path_buf(),
        source: e,
    })? {
        let file_type = entry.file_type().await.map_err(|e| Error::Planning {
            path: entry.path(),
            source: e,
        })?;
        if file_type.is_dir() == directories {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
