// backuptool/src/backup/drivers/mysql.rs
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use which::which;

use super::{unique_artifact_name, DatabaseDriver};
use crate::config::{DatabaseConfig, DriverKind};
use crate::errors::{BackupError, Result};

/// Dump-based relational driver. Streams `mysqldump` output through a gzip
/// encoder straight into `<dbname>-<token>.sql.gz`; no uncompressed dump
/// ever touches the disk.
pub struct MysqlDriver;

#[async_trait]
impl DatabaseDriver for MysqlDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Mysql
    }

    async fn backup(&self, db: &DatabaseConfig, db_dir: &Path) -> Result<PathBuf> {
        let artifact = db_dir.join(unique_artifact_name(&db.dbname, "sql.gz"));
        let db_config = db.clone();
        let dest = artifact.clone();
        tokio::task::spawn_blocking(move || dump_to_gzip(&db_config, &dest)).await??;
        println!("✅ mysqldump finished for database '{}'", db.dbname);
        Ok(artifact)
    }
}

fn driver_error(db: &DatabaseConfig, message: String) -> BackupError {
    BackupError::Driver {
        driver: DriverKind::Mysql.to_string(),
        database: db.dbname.clone(),
        message,
    }
}

fn dump_to_gzip(db: &DatabaseConfig, dest: &Path) -> Result<()> {
    let mysqldump_path = which("mysqldump").map_err(|_| {
        driver_error(
            db,
            "mysqldump executable not found in PATH. Please ensure MySQL client tools are installed.".to_string(),
        )
    })?;

    // Config validation guarantees host and user for mysql entries.
    let host = db.host.as_deref().unwrap_or("localhost");
    let user = db.user.as_deref().unwrap_or("root");

    let mut cmd = Command::new(&mysqldump_path);
    cmd.arg(format!("--host={}", host))
        .arg(format!("--port={}", db.port()))
        .arg(format!("--user={}", user))
        .arg("--single-transaction")
        .arg(&db.dbname)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(password) = &db.password {
        // Via the environment so the password never shows up in `ps`.
        cmd.env("MYSQL_PWD", password);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| driver_error(db, format!("Failed to spawn mysqldump: {}", e)))?;
    let mut dump_stream = child
        .stdout
        .take()
        .ok_or_else(|| driver_error(db, "Failed to capture mysqldump stdout".to_string()))?;

    let result = (|| -> Result<()> {
        let file = File::create(dest)
            .map_err(|e| driver_error(db, format!("Failed to create {}: {}", dest.display(), e)))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        io::copy(&mut dump_stream, &mut encoder)
            .map_err(|e| driver_error(db, format!("Failed to stream dump output: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| driver_error(db, format!("Failed to finish gzip stream: {}", e)))?;
        Ok(())
    })();

    let output = child
        .wait_with_output()
        .map_err(|e| driver_error(db, format!("Failed to wait for mysqldump: {}", e)))?;

    if result.is_err() || !output.status.success() {
        // Never leave a truncated artifact behind.
        let _ = fs::remove_file(dest);
    }
    result?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(driver_error(
            db,
            format!(
                "mysqldump exited with {}: {}",
                output.status,
                stderr.trim()
            ),
        ));
    }
    Ok(())
}
