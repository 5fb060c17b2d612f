// backuptool/src/backup/layout.rs
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;

const BACKUPS_ROOT_NAME: &str = "backups";
const DB_SUBDIR_NAME: &str = "dbs";
// Minute granularity keeps run directories sortable; two runs within the
// same minute share a run directory name.
const RUN_TIMESTAMP_FORMAT: &str = "%Y_%m_%d__%H_%M";

/// One execution of the backup pipeline. Computed once per invocation from
/// the start time and threaded through every stage; owns all paths the run
/// writes to.
#[derive(Debug, Clone)]
pub struct BackupRun {
    pub started_at: DateTime<Local>,
    /// `<work_dir>/backups` — parent of all run directories.
    pub backups_root: PathBuf,
    /// `<work_dir>/backups/BACKUP_<timestamp>` — everything this run
    /// produces before bundling lives under here.
    pub run_dir: PathBuf,
    /// `<run_dir>/dbs` — database artifacts.
    pub db_dir: PathBuf,
    /// `<work_dir>/BACKUP_<timestamp>.zip` — the final bundle, sibling of
    /// `backups/`, deleted after a successful upload.
    pub bundle_path: PathBuf,
    bundle_name: String,
}

impl BackupRun {
    /// Pure path computation; no directory is created here.
    pub fn new(now: DateTime<Local>, work_dir: &Path) -> Self {
        let run_name = format!("BACKUP_{}", now.format(RUN_TIMESTAMP_FORMAT));
        let backups_root = work_dir.join(BACKUPS_ROOT_NAME);
        let run_dir = backups_root.join(&run_name);
        let db_dir = run_dir.join(DB_SUBDIR_NAME);
        let bundle_name = format!("{}.zip", run_name);
        let bundle_path = work_dir.join(&bundle_name);

        BackupRun {
            started_at: now,
            backups_root,
            run_dir,
            db_dir,
            bundle_path,
            bundle_name,
        }
    }

    /// Object key the bundle is uploaded under.
    pub fn bundle_key(&self) -> &str {
        &self.bundle_name
    }

    /// Creates the run directory tree. Create-if-absent; an existing
    /// directory is not an error.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.backups_root)?;
        fs::create_dir_all(&self.run_dir)?;
        fs::create_dir_all(&self.db_dir)?;
        Ok(())
    }
}
