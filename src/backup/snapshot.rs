// backuptool/src/backup/snapshot.rs
use std::fs;
use std::path::Path;
use tokio::task::JoinSet;

use crate::backup::archive;
use crate::backup::layout::BackupRun;
use crate::errors::{BackupError, Result};

/// Lists folders under `base_dir` whose name contains `filter`.
///
/// Non-recursive; plain substring containment, not a glob or regex. Only
/// directories are candidates — each one gets zipped as a unit.
pub fn list_candidates(base_dir: &Path, filter: &str) -> Result<Vec<String>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(base_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(filter) {
            candidates.push(name);
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Snapshots every candidate folder into `run_dir/<name>.zip`, all in
/// parallel. Every task runs to completion; if one or more fail, the first
/// failure is returned after all have finished.
pub async fn snapshot_all(base_dir: &Path, run: &BackupRun, candidates: Vec<String>) -> Result<()> {
    let mut tasks = JoinSet::new();
    for name in candidates {
        let source = base_dir.join(&name);
        let dest = run.run_dir.join(format!("{}.zip", name));
        tasks.spawn_blocking(move || archive::compress_dir(&source, &dest).map(|_| name));
    }

    let mut first_failure: Option<BackupError> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(name) => println!("✅ Snapshotted folder: {}", name),
            Err(e) => {
                eprintln!("❌ Folder snapshot failed: {}", e);
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::fs::File;

    #[test]
    fn test_list_candidates_filters_by_substring() -> Result<()> {
        let base = tempfile::tempdir()?;
        fs::create_dir(base.path().join("photos"))?;
        fs::create_dir(base.path().join("old_photos"))?;
        fs::create_dir(base.path().join("videos"))?;
        // Plain files never match, even with a matching name.
        fs::write(base.path().join("photo.txt"), b"not a folder")?;

        let candidates = list_candidates(base.path(), "photo")?;
        assert_eq!(candidates, vec!["old_photos", "photos"]);
        Ok(())
    }

    #[test]
    fn test_list_candidates_empty_filter_matches_all_dirs() -> Result<()> {
        let base = tempfile::tempdir()?;
        fs::create_dir(base.path().join("a"))?;
        fs::create_dir(base.path().join("b"))?;

        let candidates = list_candidates(base.path(), "")?;
        assert_eq!(candidates, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_list_candidates_missing_base_dir_fails() {
        let result = list_candidates(Path::new("/nonexistent/base"), "x");
        assert!(matches!(result, Err(BackupError::Filesystem(_))));
    }

    #[tokio::test]
    async fn test_snapshot_all_produces_one_zip_per_candidate() -> anyhow::Result<()> {
        let base = tempfile::tempdir()?;
        for name in ["photos", "photo_albums"] {
            fs::create_dir(base.path().join(name))?;
            File::create(base.path().join(name).join("item.bin"))?;
        }

        let work = tempfile::tempdir()?;
        let run = BackupRun::new(Local::now(), work.path());
        run.ensure_dirs()?;

        let candidates = list_candidates(base.path(), "photo")?;
        snapshot_all(base.path(), &run, candidates).await?;

        assert!(run.run_dir.join("photos.zip").is_file());
        assert!(run.run_dir.join("photo_albums.zip").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_all_aggregates_failures() -> anyhow::Result<()> {
        let base = tempfile::tempdir()?;
        fs::create_dir(base.path().join("photos"))?;

        let work = tempfile::tempdir()?;
        let run = BackupRun::new(Local::now(), work.path());
        run.ensure_dirs()?;

        // One valid candidate, one that does not exist on disk. The stage
        // must fail overall, but the valid snapshot still completes.
        let candidates = vec!["missing".to_string(), "photos".to_string()];
        let result = snapshot_all(base.path(), &run, candidates).await;

        assert!(result.is_err());
        assert!(run.run_dir.join("photos.zip").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_all_with_no_candidates_is_a_no_op() -> anyhow::Result<()> {
        let base = tempfile::tempdir()?;
        let work = tempfile::tempdir()?;
        let run = BackupRun::new(Local::now(), work.path());
        run.ensure_dirs()?;

        snapshot_all(base.path(), &run, Vec::new()).await?;
        Ok(())
    }
}
