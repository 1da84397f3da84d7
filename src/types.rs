//! Core data types for the Tsutsumi conversion library.
//!
//! This module defines the fundamental data structures used throughout Tsutsumi:
//! - The planned unit of work (`ConversionJob`)
//! - Execution mode selection for preflight validation (`ExecutionMode`)

use std::fmt;
use std::path::PathBuf;

/// One planned conversion: a source unit (directory or matched file) and the
/// archive it will become.
///
/// Jobs are created by the planner, are immutable from then on, and are only
/// consumed by the archive builder to produce a filesystem side effect. They
/// are never persisted; a job list exists for one planning/execution run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionJob {
    /// Path to the source unit: a directory, or a single matched file.
    pub source_path: PathBuf,
    /// Path of the archive to be produced.
    pub destination_path: PathBuf,
    /// Display basename of the source unit, derived once at planning time.
    pub source_name: String,
    /// Display basename of the archive, derived once at planning time.
    pub destination_name: String,
}

impl fmt::Display for ConversionJob {
    /// Preview line format used by confirmation prompts: `source -> destination`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_name, self.destination_name)
    }
}

/// Specifies the intended workflow for a Tsutsumi run.
/// Used by `TsutsumiConfig::preflight_check` to tailor validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionMode {
    /// Every immediate subdirectory of the source root becomes one archive.
    Directories,
    /// Files matching a mask are extracted with an external tool and repackaged.
    Archives,
}
