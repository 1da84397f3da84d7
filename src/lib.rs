//! Tsutsumi - Comic Folder and Archive Repackaging Library
//!
//! This crate converts collections of loose files — comic-book page folders,
//! or RAR archives unpacked through an external tool — into normalized
//! ZIP-based `.cbz` archives.
//!
//! # Getting Started
//!
//! Configure a conversion with the `TsutsumiConfig` builder, then either run
//! it in one call or split planning from execution to put a confirmation
//! prompt in between:
//!
//! ```rust,no_run
//! use tsutsumi::prelude::*;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> tsutsumi::error::Result<()> {
//!     let config = TsutsumiConfig::builder()
//!         .source_root(PathBuf::from("./my_manga_collection"))
//!         .destination_root(PathBuf::from("./converted"))
//!         .build()?;
//!
//!     // 1. Plan: read-only, one job per immediate subdirectory
//!     let jobs = config.plan_jobs().await?;
//!     for job in &jobs {
//!         println!("{}", job); // "Series A -> Series A.cbz"
//!     }
//!
//!     // 2. (a front-end would confirm here)
//!
//!     // 3. Execute: one archive per job, strictly in order
//!     config.execute_jobs(&jobs).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! For the RAR workflow, `convert_archives` takes a masked path such as
//! `downloads/*.rar`, unpacks each match with the first available 7-Zip
//! compatible tool, and repackages the extracted tree.

pub mod archive;
pub mod error;
pub mod extract;
pub mod naming;
pub mod path_utils;
pub mod planner;
pub mod tsutsumi;
pub mod types;
pub mod walker;

// Publicly expose the main `TsutsumiConfig` struct and its builder
pub use tsutsumi::TsutsumiConfig;
pub use tsutsumi::TsutsumiConfigBuilder;

// Re-export core types for direct access
pub use types::{ConversionJob, ExecutionMode};

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types so a single
/// `use tsutsumi::prelude::*;` brings in everything needed for typical use.
pub mod prelude {
    pub use super::{ConversionJob, ExecutionMode, TsutsumiConfig, TsutsumiConfigBuilder, error};
    pub use crate::archive::ArchiveBuilder;
    pub use crate::naming::NamingRule;
    pub use crate::planner::FileMask;
    pub use crate::walker::{TreeEntry, TreeWalk};
    pub use std::path::{Path, PathBuf};
}
