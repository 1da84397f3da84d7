//! Common test utilities and constants for the Tsutsumi crate.
//!
//! Provides functions for setting up and tearing down test directories,
//! creating payload files, and inspecting produced archives.

use rand::{Rng, distributions::Alphanumeric};
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::fs;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";

/// A clean, uniquely named directory layout for one test run.
pub struct TestDirs {
    pub base: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
}

/// Helper function to create a clean test directory with source and target
/// subdirectories. Ensures the base directory is empty before a test runs.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let base = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if base.exists() {
        fs::remove_dir_all(&base).await.unwrap();
    }
    let source_dir = base.join("source");
    let target_dir = base.join("target");

    fs::create_dir_all(&source_dir).await.unwrap();
    fs::create_dir_all(&target_dir).await.unwrap();

    TestDirs {
        base,
        source_dir,
        target_dir,
    }
}

/// Writes a payload file, creating any missing parent directories.
#[allow(dead_code)]
pub async fn write_payload(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    fs::write(path, contents).await.unwrap();
}

/// Checks that a CBZ file exists and is a readable ZIP container.
#[allow(dead_code)]
pub async fn assert_valid_zip_file(path: &Path) {
    assert!(path.exists(), "Output ZIP file does not exist: {:?}", path);
    assert!(path.is_file(), "Output ZIP path is not a file: {:?}", path);

    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    zip::ZipArchive::new(file_std).unwrap();
}

/// Reads every entry of a ZIP archive as `(internal name, bytes)`, sorted by
/// internal name.
#[allow(dead_code)]
pub fn zip_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        entries.push((entry.name().to_string(), contents));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
