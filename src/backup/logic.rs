// backuptool/src/backup/logic.rs
use chrono::Local;
use std::fs;
use tokio::task;

use crate::backup::archive;
use crate::backup::drivers::{self, DriverRegistry};
use crate::backup::layout::BackupRun;
use crate::backup::s3_upload::ObjectStore;
use crate::backup::snapshot;
use crate::config::AppConfig;
use crate::errors::Result;

/// Drives one backup run through its stages, each a barrier:
/// layout → (folder snapshots ∥ database backups) → bundle → upload → cleanup.
///
/// Any failure aborts the remaining stages and leaves the run directory on
/// disk for inspection; local artifacts are only removed after a successful
/// upload.
pub async fn perform_backup_orchestration(
    config: &AppConfig,
    registry: &DriverRegistry,
    store: &dyn ObjectStore,
) -> Result<()> {
    let run = BackupRun::new(Local::now(), &config.work_dir);
    run.ensure_dirs()?;
    println!("📂 Backup run directory: {}", run.run_dir.display());

    let candidates = snapshot::list_candidates(&config.folder_path, &config.folder_filter)?;
    println!(
        "🔍 {} folder(s) selected for snapshot: {:?}",
        candidates.len(),
        candidates
    );

    // Two independent sub-pipelines writing to disjoint subpaths of the run
    // directory. Both run to completion before either result is inspected,
    // so a failure in one never cancels in-flight work in the other.
    let (folders_result, dbs_result) = tokio::join!(
        snapshot::snapshot_all(&config.folder_path, &run, candidates),
        drivers::backup_all(registry, &config.dbs, &run.db_dir),
    );
    folders_result?;
    dbs_result?;

    println!("🗜 Bundling run directory into {}", run.bundle_path.display());
    let bundle_source = run.run_dir.clone();
    let bundle_dest = run.bundle_path.clone();
    task::spawn_blocking(move || archive::compress_dir(&bundle_source, &bundle_dest)).await??;

    store.put_file(run.bundle_key(), &run.bundle_path).await?;

    clean_local_artifacts(&run)?;
    println!("🧹 Local backup artifacts removed");
    Ok(())
}

/// Removes everything the run wrote locally: the backups tree and the
/// uploaded bundle. Only called after a successful upload.
fn clean_local_artifacts(run: &BackupRun) -> Result<()> {
    fs::remove_dir_all(&run.backups_root)?;
    fs::remove_file(&run.bundle_path)?;
    Ok(())
}
