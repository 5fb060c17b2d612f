// backuptool/src/config/mod.rs
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{BackupError, Result};

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Recognized database driver kinds. Anything else in config.json lands on
/// `Unknown` and is skipped at dispatch time with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Mysql,
    Mongodb,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Mysql => write!(f, "mysql"),
            DriverKind::Mongodb => write!(f, "mongodb"),
            DriverKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One database entry from config.json.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    pub driver: DriverKind,
    pub dbname: String,
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: Option<u16>,
    pub uri: Option<String>,
}

impl DatabaseConfig {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_MYSQL_PORT)
    }
}

// Structs for deserializing config.json (camelCase keys).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpacesConfig {
    endpoint: String,
    region: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJsonConfig {
    folder_path: PathBuf,
    selected_files_name: String,
    #[serde(default)]
    dbs: Vec<DatabaseConfig>,
    aws: RawSpacesConfig,
    work_dir: Option<PathBuf>,
}

/// S3-compatible object storage settings (DigitalOcean Spaces, MinIO, AWS).
#[derive(Debug, Clone)]
pub struct SpacesConfig {
    pub endpoint_url: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
}

/// Validated application configuration. Loaded once at start and immutable
/// for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base directory whose subfolders are candidates for snapshotting.
    pub folder_path: PathBuf,
    /// Substring filter applied to folder names under `folder_path`.
    pub folder_filter: String,
    pub dbs: Vec<DatabaseConfig>,
    pub spaces: SpacesConfig,
    /// Directory where `backups/` and the final bundle are created.
    pub work_dir: PathBuf,
}

impl AppConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)?;
        let raw: RawJsonConfig = serde_json::from_str(&config_content).map_err(|e| {
            BackupError::Config(format!(
                "Failed to parse JSON from config file at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawJsonConfig) -> Result<Self> {
        if raw.selected_files_name.is_empty() {
            return Err(BackupError::Config(
                "selectedFilesName cannot be empty in config.json".to_string(),
            ));
        }

        for db in &raw.dbs {
            validate_database_entry(db)?;
        }

        let spaces = resolve_spaces_config(raw.aws)?;

        Ok(AppConfig {
            folder_path: raw.folder_path,
            folder_filter: raw.selected_files_name,
            dbs: raw.dbs,
            spaces,
            work_dir: raw.work_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

fn validate_database_entry(db: &DatabaseConfig) -> Result<()> {
    if db.dbname.trim().is_empty() {
        return Err(BackupError::Config(
            "dbname cannot be empty for a database entry in config.json".to_string(),
        ));
    }

    match db.driver {
        DriverKind::Mysql => {
            if db.host.as_deref().map_or(true, |s| s.is_empty()) {
                return Err(BackupError::Config(format!(
                    "mysql database '{}' requires a host in config.json",
                    db.dbname
                )));
            }
            if db.user.as_deref().map_or(true, |s| s.is_empty()) {
                return Err(BackupError::Config(format!(
                    "mysql database '{}' requires a user in config.json",
                    db.dbname
                )));
            }
        }
        DriverKind::Mongodb => {
            if db.uri.as_deref().map_or(true, |s| s.is_empty()) {
                return Err(BackupError::Config(format!(
                    "mongodb database '{}' requires a uri in config.json",
                    db.dbname
                )));
            }
        }
        // Unrecognized kinds pass validation and are skipped at dispatch.
        DriverKind::Unknown => {}
    }
    Ok(())
}

/// Builds the storage settings, letting SPACES_ACCESS_KEY / SPACES_SECRET_KEY
/// environment variables stand in for the accessKey / secretKey JSON fields.
fn resolve_spaces_config(raw: RawSpacesConfig) -> Result<SpacesConfig> {
    if raw.endpoint.is_empty() {
        return Err(BackupError::Config(
            "aws.endpoint cannot be empty in config.json".to_string(),
        ));
    }
    if raw.bucket.is_empty() {
        return Err(BackupError::Config(
            "aws.bucket cannot be empty in config.json".to_string(),
        ));
    }

    let access_key_id = raw
        .access_key
        .filter(|s| !s.is_empty())
        .or_else(|| env::var("SPACES_ACCESS_KEY").ok())
        .ok_or_else(|| {
            BackupError::Config(
                "aws.accessKey must be set in config.json or via SPACES_ACCESS_KEY".to_string(),
            )
        })?;
    let secret_access_key = raw
        .secret_key
        .filter(|s| !s.is_empty())
        .or_else(|| env::var("SPACES_SECRET_KEY").ok())
        .ok_or_else(|| {
            BackupError::Config(
                "aws.secretKey must be set in config.json or via SPACES_SECRET_KEY".to_string(),
            )
        })?;

    Ok(SpacesConfig {
        endpoint_url: raw.endpoint,
        region: raw.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        access_key_id,
        secret_access_key,
        bucket_name: raw.bucket,
    })
}
