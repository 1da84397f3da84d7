//! Depth-first directory tree walking.
//!
//! This module provides [`TreeWalk`], a lazy, pre-order iterator over a
//! directory tree. It is used twice in the pipeline: by the planner to list a
//! source root's immediate children and by the archive builder to enumerate
//! every file inside one source unit.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// A transient traversal record: one visited directory with its immediate
/// children, partitioned by filesystem type at the moment of listing.
///
/// Entry order inside `subdirectory_names` and `file_names` is whatever the
/// filesystem provides; callers that need determinism sort the names
/// themselves (the planner does).
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// The visited directory.
    pub path: PathBuf,
    /// Names of immediate subdirectories, in discovery order.
    pub subdirectory_names: Vec<OsString>,
    /// Names of immediate files, in discovery order.
    pub file_names: Vec<OsString>,
}

/// Lazy, finite, depth-first walk over a directory tree.
///
/// Yields one [`TreeEntry`] per visited directory, including the root, in
/// pre-order: a directory's entry is produced before any of its descendants.
/// The iterator is not restartable; create a new `TreeWalk` to re-traverse.
///
/// Failure policy is STOP-ON-ERROR: if a directory cannot be listed, the walk
/// yields one `Err` and then fuses. Entries are classified once at listing
/// time; a rename or delete between listing and use is a race the caller must
/// tolerate.
#[derive(Debug)]
pub struct TreeWalk {
    pending: VecDeque<PathBuf>,
    failed: bool,
}

impl TreeWalk {
    /// Starts a new walk rooted at `root`. No I/O happens until the first
    /// call to `next`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut pending = VecDeque::new();
        pending.push_front(root.into());
        Self {
            pending,
            failed: false,
        }
    }

    fn read_entry(path: PathBuf) -> Result<TreeEntry> {
        let mut subdirectory_names = Vec::new();
        let mut file_names = Vec::new();

        let listing = fs::read_dir(&path).map_err(|e| Error::Planning {
            path: path.clone(),
            source: e,
        })?;

        for entry in listing {
            let entry = entry.map_err(|e| Error::Planning {
                path: path.clone(),
                source: e,
            })?;
            let file_type = entry.file_type().map_err(|e| Error::Planning {
                path: entry.path(),
                source: e,
            })?;

            if file_type.is_dir() {
                subdirectory_names.push(entry.file_name());
            } else {
                file_names.push(entry.file_name());
            }
        }

        Ok(TreeEntry {
            path,
            subdirectory_names,
            file_names,
        })
    }
}

impl Iterator for TreeWalk {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let dir = self.pending.pop_front()?;

        match Self::read_entry(dir) {
            Ok(entry) => {
                // Push subdirectories onto the front in reverse so they are
                // visited in discovery order, depth-first.
                for name in entry.subdirectory_names.iter().rev() {
                    self.pending.push_front(entry.path.join(name));
                }
                Some(Ok(entry))
            }
            Err(e) => {
                self.failed = true;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }
}
