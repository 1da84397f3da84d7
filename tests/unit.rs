//! Unit tests for core Tsutsumi functionality.
//!
//! Tests planning and configuration in isolation, without building archives.

use tsutsumi::error::Result;
use tsutsumi::planner;
use tsutsumi::prelude::*;

mod common;
use common::setup_test_dirs;

#[tokio::test]
async fn test_config_builder_rejects_bad_rule() -> Result<()> {
    // Replacement references group 2 which the pattern does not define.
    let result = TsutsumiConfig::builder()
        .source_root(PathBuf::from("/tmp"))
        .rule_pattern(r"(\d+)".to_string())
        .rule_replacement("${2}".to_string())
        .build();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("group '2'"));

    // Pattern without replacement is incomplete.
    let result = TsutsumiConfig::builder()
        .source_root(PathBuf::from("/tmp"))
        .rule_pattern(r"(\d+)".to_string())
        .build();
    assert!(result.is_err());

    // Match-only without any rule makes no sense.
    let result = TsutsumiConfig::builder()
        .source_root(PathBuf::from("/tmp"))
        .match_only(true)
        .build();
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_preflight_check_directory_mode() -> Result<()> {
    let test_dirs = setup_test_dirs("preflight_check").await;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .build()?;
    assert!(config.preflight_check(ExecutionMode::Directories).is_ok());

    // Missing source root
    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.join("nonexistent"))
        .build()?;
    let result = config.preflight_check(ExecutionMode::Directories);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Source root does not exist")
    );

    // Source root is a file, not a directory
    let file_root = test_dirs.source_dir.join("file.txt");
    tokio::fs::write(&file_root, b"x").await?;
    let config = TsutsumiConfig::builder().source_root(file_root).build()?;
    assert!(config.preflight_check(ExecutionMode::Directories).is_err());

    Ok(())
}

#[tokio::test]
async fn test_plan_jobs_sorted_ascii_ordinal() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_sorted").await;
    // Byte-wise sort: uppercase "B" comes before lowercase "a".
    tokio::fs::create_dir(test_dirs.source_dir.join("a")).await?;
    tokio::fs::create_dir(test_dirs.source_dir.join("B")).await?;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .destination_root(test_dirs.target_dir.clone())
        .build()?;
    let jobs = config.plan_jobs().await?;

    let names: Vec<(&str, &str)> = jobs
        .iter()
        .map(|j| (j.source_name.as_str(), j.destination_name.as_str()))
        .collect();
    assert_eq!(names, vec![("B", "B.cbz"), ("a", "a.cbz")]);
    assert_eq!(jobs[0].source_path, test_dirs.source_dir.join("B"));
    assert_eq!(jobs[0].destination_path, test_dirs.target_dir.join("B.cbz"));

    Ok(())
}

#[tokio::test]
async fn test_plan_jobs_is_deterministic_and_read_only() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_deterministic").await;
    tokio::fs::create_dir(test_dirs.source_dir.join("Series A")).await?;
    tokio::fs::create_dir(test_dirs.source_dir.join("Series B")).await?;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .build()?;

    let first = config.plan_jobs().await?;
    let second = config.plan_jobs().await?;
    assert_eq!(first, second);

    // Planning must not create anything; the target area stays untouched.
    let mut listing = tokio::fs::read_dir(&test_dirs.source_dir).await?;
    let mut children = 0;
    while listing.next_entry().await?.is_some() {
        children += 1;
    }
    assert_eq!(children, 2);

    // Default destination is the source root itself.
    assert_eq!(
        first[0].destination_path,
        test_dirs.source_dir.join("Series A.cbz")
    );

    Ok(())
}

#[tokio::test]
async fn test_plan_jobs_skips_plain_files() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_skips_files").await;
    tokio::fs::create_dir(test_dirs.source_dir.join("Series")).await?;
    tokio::fs::write(test_dirs.source_dir.join("stray.txt"), b"x").await?;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .build()?;
    let jobs = config.plan_jobs().await?;

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].source_name, "Series");
    Ok(())
}

#[tokio::test]
async fn test_plan_jobs_empty_root_is_not_an_error() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_empty").await;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .build()?;
    let jobs = config.plan_jobs().await?;
    assert!(jobs.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_plan_jobs_applies_rule_literally() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_rule").await;
    tokio::fs::create_dir(test_dirs.source_dir.join("Series Name (v2)")).await?;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .rule_pattern(r"^(.*) \(v(\d+)\)$".to_string())
        .rule_replacement("${1}_v${2}".to_string())
        .build()?;
    let jobs = config.plan_jobs().await?;

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].destination_name, "Series Name_v2");
    Ok(())
}

#[tokio::test]
async fn test_plan_jobs_match_only_excludes_everything_on_no_match() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_match_only").await;
    for name in ["one", "two", "three"] {
        tokio::fs::create_dir(test_dirs.source_dir.join(name)).await?;
    }

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .rule_pattern(r"^vol(\d+)$".to_string())
        .rule_replacement("Volume ${1}.cbz".to_string())
        .match_only(true)
        .build()?;
    let jobs = config.plan_jobs().await?;
    assert!(jobs.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_job_preview_display_format() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_display").await;
    tokio::fs::create_dir(test_dirs.source_dir.join("Series")).await?;

    let config = TsutsumiConfig::builder()
        .source_root(test_dirs.source_dir.clone())
        .build()?;
    let jobs = config.plan_jobs().await?;
    assert_eq!(jobs[0].to_string(), "Series -> Series.cbz");
    Ok(())
}

#[tokio::test]
async fn test_plan_archive_jobs_with_suffix_mask() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_mask").await;
    tokio::fs::write(test_dirs.source_dir.join("b.rar"), b"x").await?;
    tokio::fs::write(test_dirs.source_dir.join("a.rar"), b"x").await?;
    tokio::fs::write(test_dirs.source_dir.join("notes.txt"), b"x").await?;

    let jobs = planner::plan_archive_jobs(
        &test_dirs.source_dir.join("*.rar"),
        Some(test_dirs.target_dir.as_path()),
    )
    .await?;

    let names: Vec<(&str, &str)> = jobs
        .iter()
        .map(|j| (j.source_name.as_str(), j.destination_name.as_str()))
        .collect();
    assert_eq!(names, vec![("a.rar", "a.cbz"), ("b.rar", "b.cbz")]);
    assert_eq!(jobs[0].destination_path, test_dirs.target_dir.join("a.cbz"));

    Ok(())
}

#[tokio::test]
async fn test_plan_archive_jobs_explicit_file_destination() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_mask_file_dest").await;
    tokio::fs::write(test_dirs.source_dir.join("only.rar"), b"x").await?;

    let explicit = test_dirs.target_dir.join("renamed.cbz");
    let jobs =
        planner::plan_archive_jobs(&test_dirs.source_dir.join("*.rar"), Some(&explicit)).await?;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].destination_path, explicit);
    assert_eq!(jobs[0].destination_name, "renamed.cbz");

    // A second match makes an explicit file destination ambiguous.
    tokio::fs::write(test_dirs.source_dir.join("second.rar"), b"x").await?;
    let result =
        planner::plan_archive_jobs(&test_dirs.source_dir.join("*.rar"), Some(&explicit)).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_plan_archive_jobs_defaults_destination_to_source_dir() -> Result<()> {
    let test_dirs = setup_test_dirs("plan_mask_default_dest").await;
    tokio::fs::write(test_dirs.source_dir.join("vol1.rar"), b"x").await?;

    let jobs = planner::plan_archive_jobs(&test_dirs.source_dir.join("vol*"), None).await?;
    assert_eq!(jobs.len(), 1);
    assert_eq!(
        jobs[0].destination_path,
        test_dirs.source_dir.join("vol1.cbz")
    );
    Ok(())
}
