//! CBZ archive construction.
//!
//! The builder consumes one [`ConversionJob`] at a time: it walks the job's
//! source tree and writes every file into a ZIP container at the file's path
//! relative to the source unit root, preserving nested directory structure
//! with forward-slash internal separators.
//!
//! Writes go to a `.partial` staging path next to the destination and are
//! renamed into place only after the archive has been flushed and closed, so
//! a failed build never leaves something at the destination path that could
//! be mistaken for a complete archive.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use memmap2::MmapOptions;
use tokio::fs;
use tokio::task::spawn_blocking;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::path_utils::relative_archive_name;
use crate::types::ConversionJob;
use crate::walker::TreeWalk;

/// Builds CBZ archives from planned conversion jobs.
///
/// The builder holds no per-job state; one instance can execute any number of
/// jobs sequentially. It never mutates a job, only the filesystem.
pub struct ArchiveBuilder {
    options: SimpleFileOptions,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        Self { options }
    }

    /// Writes the archive for `job`.
    ///
    /// Creates missing parent directories of the destination, truncates any
    /// existing archive there, and packages every file under
    /// `job.source_path`. A source unit with zero files produces a valid,
    /// empty archive.
    ///
    /// # Errors
    ///
    /// `Error::Build` with the destination path and underlying cause if the
    /// source vanished mid-walk, a payload file could not be read, or the
    /// destination could not be written. The staging file is removed on
    /// failure.
    pub async fn build(&self, job: &ConversionJob) -> Result<()> {
        if let Some(parent) = job.destination_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let job = job.clone();
        let options = self.options;
        spawn_blocking(move || build_blocking(&job, options)).await??;

        Ok(())
    }
}

fn build_blocking(job: &ConversionJob, options: SimpleFileOptions) -> Result<()> {
    let staging = staging_path(&job.destination_path);

    match write_archive(job, &staging, options) {
        Ok(file_count) => {
            // Truncate/overwrite semantics: an existing archive at the
            // destination is replaced atomically.
            if job.destination_path.exists() {
                std::fs::remove_file(&job.destination_path)
                    .map_err(|e| build_error(&job.destination_path, &e))?;
            }
            std::fs::rename(&staging, &job.destination_path)
                .map_err(|e| build_error(&job.destination_path, &e))?;
            info!(
                "wrote {:?} ({} file(s))",
                job.destination_path, file_count
            );
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(&staging);
            Err(build_error(&job.destination_path, &e))
        }
    }
}

fn write_archive(
    job: &ConversionJob,
    staging: &Path,
    options: SimpleFileOptions,
) -> Result<usize> {
    let file = File::create(staging)?;
    let mut zip = ZipWriter::new(file);
    let mut file_count = 0usize;

    for entry in TreeWalk::new(&job.source_path) {
        let entry = entry?;
        for name in &entry.file_names {
            let absolute = entry.path.join(name);
            let archive_name = relative_archive_name(&job.source_path, &absolute)?;
            debug!("adding {}", archive_name);

            let payload = File::open(&absolute)?;
            zip.start_file(archive_name, options)?;

            // Mapping a zero-length file fails on some platforms; an empty
            // entry needs no payload write at all.
            if payload.metadata()?.len() > 0 {
                let mmap = unsafe { MmapOptions::new().map(&payload)? };
                zip.write_all(&mmap[..])?;
            }
            file_count += 1;
        }
    }

    let mut finished = zip.finish()?;
    finished.flush()?;
    Ok(file_count)
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}

fn build_error(destination: &Path, cause: &dyn std::fmt::Display) -> Error {
    Error::Build {
        destination: destination.to_path_buf(),
        detail: cause.to_string(),
    }
}
