//! Backup Orchestrator
//!
//! Snapshots data folders and databases, bundles them and ships the bundle
//! to S3-compatible object storage.

// backuptool/src/main.rs
use anyhow::{Context, Result};
use backuptool::backup;
use backuptool::config::AppConfig;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Main entry point for the backup tool
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => {
            println!("✅ Backup completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    // Allow SPACES_ACCESS_KEY / SPACES_SECRET_KEY to come from a .env file
    // instead of config.json.
    dotenv::dotenv().ok();

    // Path to config.json. Defaults to the working directory, can be passed
    // as the first CLI argument.
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    let app_config = AppConfig::load_from_json(&config_path).with_context(|| {
        format!(
            "Failed to load application configuration from {}",
            config_path.display()
        )
    })?;

    println!("🚀 Starting Backup Process...");
    backup::run_backup_flow(&app_config)
        .await
        .context("Backup process failed")?;
    Ok(())
}
