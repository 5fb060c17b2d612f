pub mod archive;
pub mod drivers;
pub mod layout;
pub mod logic;
pub mod s3_upload;
pub mod snapshot;

use crate::config::AppConfig;
use crate::errors::Result;

/// Public entry point for the backup process: built-in drivers, S3 upload.
pub async fn run_backup_flow(config: &AppConfig) -> Result<()> {
    let registry = drivers::DriverRegistry::builtin();
    let store = s3_upload::SpacesStore::new(config.spaces.clone());
    logic::perform_backup_orchestration(config, &registry, &store).await
}
