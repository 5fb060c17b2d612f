//! Scheduled backup orchestrator.
//!
//! Snapshots configured data folders and databases (MySQL and MongoDB),
//! bundles everything into a single zip archive, uploads the bundle to
//! S3-compatible object storage and removes the local artifacts.

pub mod backup;
pub mod config;
pub mod errors;
