//! The main Tsutsumi configuration and conversion entry points.

use std::path::{Path, PathBuf};

use log::{info, warn};
use tokio::fs;

use crate::archive::ArchiveBuilder;
use crate::error::{Error, Result};
use crate::extract::{self, DEFAULT_TOOL_CANDIDATES};
use crate::naming::NamingRule;
use crate::planner;
use crate::types::{ConversionJob, ExecutionMode};

/// The main Tsutsumi conversion configuration, built declaratively using the
/// builder pattern.
///
/// Planning and execution are separable operations so a front-end can insert
/// a confirmation gate between them:
///
/// - [`plan_jobs`](TsutsumiConfig::plan_jobs): read-only enumeration of the
///   work to be done
/// - [`execute_jobs`](TsutsumiConfig::execute_jobs): sequential archive
///   construction for a previously planned list
/// - [`convert_directories`](TsutsumiConfig::convert_directories): both steps
///   in one call for non-interactive use
/// - [`convert_archives`](TsutsumiConfig::convert_archives): the
///   extract-then-repackage workflow for proprietary archive formats
///
/// ## Builder Pattern
///
/// Use [`TsutsumiConfig::builder()`](TsutsumiConfig::builder) to create a new
/// configuration:
///
/// ```rust,no_run
/// # use tsutsumi::prelude::*;
/// # use std::path::PathBuf;
/// let config = TsutsumiConfig::builder()
///     .source_root(PathBuf::from("./collection"))
///     .destination_root(PathBuf::from("./converted"))
///     .rule_pattern(r"^(.*) \(scans\)$".to_string())
///     .rule_replacement("${1}.cbz".to_string())
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TsutsumiConfig {
    /// Root directory whose immediate subdirectories (directory mode) or
    /// matched files (archive mode) become conversion jobs.
    #[builder(default)]
    pub source_root: PathBuf,

    /// Directory where archives are written. Defaults to the source root
    /// when unset. In archive mode this may also name a single output file,
    /// which is only valid when the mask matches exactly one source.
    #[builder(default)]
    pub destination_root: Option<PathBuf>,

    /// Regex pattern of the rename rule. Requires `rule_replacement`.
    ///
    /// When no rule is configured, destination names default to the source
    /// name with `.cbz` appended.
    #[builder(default)]
    pub rule_pattern: Option<String>,

    /// Replacement template of the rename rule. May reference captured
    /// groups as `${1}` or `$name`; requires `rule_pattern`.
    #[builder(default)]
    pub rule_replacement: Option<String>,

    /// Match-only planning: source units whose names do not match
    /// `rule_pattern` are excluded from the job list instead of passing
    /// through with an unchanged name.
    #[builder(default = "false")]
    pub match_only: bool,

    /// Parent directory for per-job extraction directories in archive mode.
    /// Defaults to the system temporary directory.
    #[builder(default)]
    pub temp_dir: Option<PathBuf>,

    /// Delete each matched source archive after its CBZ has been written
    /// successfully. A failed extraction or build always leaves the original
    /// in place.
    #[builder(default = "false")]
    pub delete_original: bool,

    /// Extraction binaries to probe, in priority order.
    #[builder(default = "default_tool_candidates()")]
    pub tool_candidates: Vec<String>,
}

fn default_tool_candidates() -> Vec<String> {
    DEFAULT_TOOL_CANDIDATES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl std::fmt::Debug for TsutsumiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsutsumiConfig")
            .field("source_root", &self.source_root)
            .field("destination_root", &self.destination_root)
            .field("rule_pattern", &self.rule_pattern)
            .field("rule_replacement", &self.rule_replacement)
            .field("match_only", &self.match_only)
            .field("temp_dir", &self.temp_dir)
            .field("delete_original", &self.delete_original)
            .field("tool_candidates", &self.tool_candidates)
            .finish()
    }
}

impl TsutsumiConfig {
    /// Creates a new builder for configuring `TsutsumiConfig`.
    pub fn builder() -> TsutsumiConfigBuilder {
        TsutsumiConfigBuilder::default()
    }

    /// Performs validation checks on the configuration for a specific
    /// execution mode, without touching the filesystem destinations.
    ///
    /// All conversion entry points call this themselves; manual invocation is
    /// optional but useful for early error detection in interactive
    /// front-ends.
    pub fn preflight_check(&self, mode: ExecutionMode) -> Result<&Self> {
        // Rule strings were validated at build time; recompiling here keeps
        // hand-constructed configs honest too.
        self.naming_rule()?;

        match mode {
            ExecutionMode::Directories => {
                if self.source_root.as_os_str().is_empty() {
                    return Err(Error::Other(
                        "`source_root` must be set for directory conversion.".to_string(),
                    ));
                }
                if !self.source_root.exists() {
                    return Err(Error::NotFound(format!(
                        "Source root does not exist: {:?}",
                        self.source_root
                    )));
                }
                if !self.source_root.is_dir() {
                    return Err(Error::InvalidPath(
                        self.source_root.clone(),
                        "Source root is not a directory.".to_string(),
                    ));
                }
            }
            ExecutionMode::Archives => {
                if self.tool_candidates.is_empty() {
                    return Err(Error::ToolNotFound("<empty candidate list>".to_string()));
                }
            }
        }

        Ok(self)
    }

    /// Compiles the configured rename rule, if any.
    pub fn naming_rule(&self) -> Result<Option<NamingRule>> {
        match (&self.rule_pattern, &self.rule_replacement) {
            (None, None) => Ok(None),
            (Some(pattern), Some(replacement)) => Ok(Some(
                NamingRule::new(pattern, replacement)?.match_only(self.match_only),
            )),
            _ => Err(Error::MalformedRule(
                "rule pattern and replacement must be given together".to_string(),
            )),
        }
    }

    /// The effective destination directory: the configured one, or the
    /// source root itself.
    pub fn effective_destination(&self) -> &Path {
        self.destination_root.as_deref().unwrap_or(&self.source_root)
    }

    // --- Directory mode ---

    /// Plans one job per immediate subdirectory of the source root.
    ///
    /// Read-only: no file or directory is created, deleted or modified.
    /// Jobs are sorted by source name so repeated calls over unchanged input
    /// return the same list.
    pub async fn plan_jobs(&self) -> Result<Vec<ConversionJob>> {
        self.preflight_check(ExecutionMode::Directories)?;
        let rule = self.naming_rule()?;

        planner::plan_directory_jobs(&self.source_root, self.effective_destination(), rule.as_ref())
            .await
    }

    /// Executes previously planned jobs, strictly one at a time, in order.
    ///
    /// Stops at the first failing job; archives already written remain valid.
    pub async fn execute_jobs(&self, jobs: &[ConversionJob]) -> Result<()> {
        let builder = ArchiveBuilder::new();

        for job in jobs {
            info!("converting {}", job);
            builder.build(job).await?;
        }
        Ok(())
    }

    /// Plans and executes in one call, for non-interactive use.
    pub async fn convert_directories(&self) -> Result<()> {
        let jobs = self.plan_jobs().await?;
        self.execute_jobs(&jobs).await
    }

    // --- Archive mode ---

    /// Converts every file matching the mask embedded in `masked_path`
    /// (e.g. `downloads/*.rar`) into a CBZ.
    ///
    /// Each match is unpacked by the external tool into a uniquely named
    /// temporary directory, repackaged, and the temporary directory removed
    /// whether or not the job succeeded. The original file is deleted only
    /// when `delete_original` is set *and* its archive was written
    /// successfully. A missing extraction tool aborts before any file is
    /// touched.
    pub async fn convert_archives(&self, masked_path: &Path) -> Result<()> {
        self.preflight_check(ExecutionMode::Archives)?;
        let tool = extract::find_extraction_tool(&self.tool_candidates).await?;

        let jobs =
            planner::plan_archive_jobs(masked_path, self.destination_root.as_deref()).await?;
        if jobs.is_empty() {
            warn!("mask {:?} matched no files", masked_path);
            return Ok(());
        }

        let builder = ArchiveBuilder::new();
        for job in &jobs {
            info!("converting {}", job);
            self.convert_one_archive(&tool, &builder, job).await?;
        }
        Ok(())
    }

    async fn convert_one_archive(
        &self,
        tool: &str,
        builder: &ArchiveBuilder,
        job: &ConversionJob,
    ) -> Result<()> {
        let temp_base = match &self.temp_dir {
            Some(dir) => {
                fs::create_dir_all(dir).await?;
                dir.clone()
            }
            None => std::env::temp_dir(),
        };

        // Dropping the TempDir removes it, so cleanup happens on every exit
        // path, including failed extraction and failed builds.
        let unpack_dir = tempfile::Builder::new()
            .prefix("tsutsumi-")
            .tempdir_in(&temp_base)?;

        extract::extract_archive(tool, &job.source_path, unpack_dir.path()).await?;

        let unpacked_job = ConversionJob {
            source_path: unpack_dir.path().to_path_buf(),
            destination_path: job.destination_path.clone(),
            source_name: job.source_name.clone(),
            destination_name: job.destination_name.clone(),
        };
        builder.build(&unpacked_job).await?;

        unpack_dir.close()?;

        if self.delete_original {
            info!("deleting original {:?}", job.source_path);
            fs::remove_file(&job.source_path).await?;
        }
        Ok(())
    }
}

impl TsutsumiConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        let pattern = self.rule_pattern.clone().flatten();
        let replacement = self.rule_replacement.clone().flatten();

        match (&pattern, &replacement) {
            (None, None) => {}
            (Some(p), Some(r)) => {
                // Surface bad rules at build time, not mid-run.
                if let Err(e) = NamingRule::new(p, r) {
                    return Err(e.to_string());
                }
            }
            _ => {
                return Err(
                    "rule pattern and replacement must be given together".to_string(),
                );
            }
        }

        if matches!(self.match_only, Some(true)) && pattern.is_none() {
            return Err("match-only mode requires a rule pattern".to_string());
        }

        Ok(())
    }
}
