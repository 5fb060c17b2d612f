// backuptool/src/backup/drivers/mod.rs
pub mod mongo;
pub mod mysql;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::{DatabaseConfig, DriverKind};
use crate::errors::{BackupError, Result};

/// A pluggable strategy for backing up one kind of database.
///
/// `backup` writes exactly one compressed artifact into `db_dir` and returns
/// its path; it fails with a `Driver` error when the connection cannot be
/// established, the dump/export fails or the artifact cannot be written.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    fn kind(&self) -> DriverKind;
    async fn backup(&self, db: &DatabaseConfig, db_dir: &Path) -> Result<PathBuf>;
}

/// Explicit driver lookup keyed by `DriverKind`. A kind with no registered
/// driver is skipped with a warning and produces no artifact and no error.
pub struct DriverRegistry {
    drivers: HashMap<DriverKind, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        DriverRegistry {
            drivers: HashMap::new(),
        }
    }

    /// Registry with the built-in MySQL and MongoDB drivers.
    pub fn builtin() -> Self {
        Self::new()
            .with_driver(Arc::new(mysql::MysqlDriver))
            .with_driver(Arc::new(mongo::MongoDriver))
    }

    /// Registers a driver under its own kind, replacing any previous driver
    /// for that kind.
    pub fn with_driver(mut self, driver: Arc<dyn DatabaseDriver>) -> Self {
        self.drivers.insert(driver.kind(), driver);
        self
    }

    pub fn get(&self, kind: DriverKind) -> Option<Arc<dyn DatabaseDriver>> {
        self.drivers.get(&kind).cloned()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique artifact filename: `<dbname>-<token>.<ext>`. The random token
/// keeps artifacts from colliding within a run and across runs that share a
/// run directory.
pub fn unique_artifact_name(dbname: &str, extension: &str) -> String {
    format!("{}-{}.{}", dbname, Uuid::new_v4(), extension)
}

/// Backs up all configured databases in parallel, no inter-database
/// ordering. Every started backup runs to completion; the first failure is
/// returned after all have finished.
pub async fn backup_all(
    registry: &DriverRegistry,
    dbs: &[DatabaseConfig],
    db_dir: &Path,
) -> Result<()> {
    let mut tasks = JoinSet::new();
    for db in dbs {
        let Some(driver) = registry.get(db.driver) else {
            eprintln!(
                "⚠️ Skipping database '{}': no driver registered for kind '{}'",
                db.dbname, db.driver
            );
            continue;
        };
        let db = db.clone();
        let db_dir = db_dir.to_path_buf();
        tasks.spawn(async move {
            let dbname = db.dbname.clone();
            driver.backup(&db, &db_dir).await.map(|path| (dbname, path))
        });
    }

    let mut first_failure: Option<BackupError> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok((dbname, path)) => {
                println!("✅ Backed up database '{}' to {}", dbname, path.display())
            }
            Err(e) => {
                eprintln!("❌ Database backup failed: {}", e);
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
    use std::fs;

    struct FakeDriver {
        kind: DriverKind,
        fail: bool,
    }

    #[async_trait]
    impl DatabaseDriver for FakeDriver {
        fn kind(&self) -> DriverKind {
            self.kind
        }

        async fn backup(&self, db: &DatabaseConfig, db_dir: &Path) -> Result<PathBuf> {
            if self.fail {
                return Err(BackupError::Driver {
                    driver: self.kind.to_string(),
                    database: db.dbname.clone(),
                    message: "simulated failure".to_string(),
                });
            }
            let artifact = db_dir.join(unique_artifact_name(&db.dbname, "dump"));
            fs::write(&artifact, b"dump").map_err(BackupError::Filesystem)?;
            Ok(artifact)
        }
    }

    fn db_entry(driver: DriverKind, dbname: &str) -> DatabaseConfig {
        DatabaseConfig {
            driver,
            dbname: dbname.to_string(),
            host: None,
            user: None,
            password: None,
            port: None,
            uri: None,
        }
    }

    #[test]
    fn test_unique_artifact_name_has_token() {
        let first = unique_artifact_name("app", "sql.gz");
        let second = unique_artifact_name("app", "sql.gz");

        assert!(first.starts_with("app-"));
        assert!(first.ends_with(".sql.gz"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_builtin_registry_covers_known_kinds() {
        let registry = DriverRegistry::builtin();
        assert!(registry.get(DriverKind::Mysql).is_some());
        assert!(registry.get(DriverKind::Mongodb).is_some());
        assert!(registry.get(DriverKind::Unknown).is_none());
    }

    #[tokio::test]
    async fn test_backup_all_skips_unrecognized_kind_without_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let registry = DriverRegistry::builtin();
        let dbs = vec![db_entry(DriverKind::Unknown, "legacy")];

        backup_all(&registry, &dbs, dir.path()).await?;
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_backup_all_produces_one_artifact_per_database() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let registry = DriverRegistry::new().with_driver(Arc::new(FakeDriver {
            kind: DriverKind::Mysql,
            fail: false,
        }));
        let dbs = vec![
            db_entry(DriverKind::Mysql, "app"),
            db_entry(DriverKind::Mysql, "analytics"),
        ];

        backup_all(&registry, &dbs, dir.path()).await?;
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_backup_all_aggregates_failures() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let registry = DriverRegistry::new()
            .with_driver(Arc::new(FakeDriver {
                kind: DriverKind::Mysql,
                fail: false,
            }))
            .with_driver(Arc::new(FakeDriver {
                kind: DriverKind::Mongodb,
                fail: true,
            }));
        let dbs = vec![
            db_entry(DriverKind::Mysql, "app"),
            db_entry(DriverKind::Mongodb, "app"),
        ];

        let result = backup_all(&registry, &dbs, dir.path()).await;
        assert!(matches!(result, Err(BackupError::Driver { .. })));
        // The healthy driver still completed its backup.
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
