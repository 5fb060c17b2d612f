// backuptool/src/backup/drivers/mongo.rs
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

use super::{unique_artifact_name, DatabaseDriver};
use crate::backup::archive;
use crate::config::{DatabaseConfig, DriverKind};
use crate::errors::{BackupError, Result};

/// Export-based document-store driver. Serializes every collection of the
/// target database to JSON in a temporary working directory, compresses the
/// directory into `<dbname>-<token>.zip` and deletes the working copy.
pub struct MongoDriver;

#[async_trait]
impl DatabaseDriver for MongoDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Mongodb
    }

    async fn backup(&self, db: &DatabaseConfig, db_dir: &Path) -> Result<PathBuf> {
        let uri = db
            .uri
            .as_deref()
            .ok_or_else(|| driver_error(db, "missing connection uri".to_string()))?;

        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| driver_error(db, format!("Failed to connect: {}", e)))?;
        let database = client.database(&db.dbname);
        let collections = database
            .list_collection_names()
            .await
            .map_err(|e| driver_error(db, format!("Failed to list collections: {}", e)))?;

        let work_dir = tempfile::Builder::new()
            .prefix(&format!("{}-export-", db.dbname))
            .tempdir()
            .map_err(|e| driver_error(db, format!("Failed to create working directory: {}", e)))?;

        // Collections are exported in parallel, no ordering guarantee. All
        // started exports run to completion even when one fails.
        let mut tasks = JoinSet::new();
        for name in collections {
            let coll = database.collection::<Document>(&name);
            let out_path = work_dir.path().join(format!("{}.json", name));
            let dbname = db.dbname.clone();
            tasks.spawn(async move {
                export_collection(coll, &dbname, &name, &out_path)
                    .await
                    .map(|_| name)
            });
        }

        let mut first_failure: Option<BackupError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok(name) => println!("✅ Exported collection '{}' of '{}'", name, db.dbname),
                Err(e) => {
                    eprintln!("❌ Collection export failed: {}", e);
                    first_failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_failure {
            // work_dir is removed on drop; the client closes on drop.
            return Err(e);
        }

        let artifact = db_dir.join(unique_artifact_name(&db.dbname, "zip"));
        let source = work_dir.path().to_path_buf();
        let dest = artifact.clone();
        tokio::task::spawn_blocking(move || archive::compress_dir(&source, &dest))
            .await?
            .map_err(|e| driver_error(db, format!("Failed to compress export: {}", e)))?;

        work_dir
            .close()
            .map_err(|e| driver_error(db, format!("Failed to remove working directory: {}", e)))?;
        client.shutdown().await;

        Ok(artifact)
    }
}

fn driver_error(db: &DatabaseConfig, message: String) -> BackupError {
    BackupError::Driver {
        driver: DriverKind::Mongodb.to_string(),
        database: db.dbname.clone(),
        message,
    }
}

/// Reads every document of `coll` and writes the collection as one JSON
/// array to `out_path`.
///
/// The whole collection is materialized in memory before serialization, so
/// memory grows with collection size. Acceptable for the data sets this tool
/// targets; streaming documents to disk incrementally would lift that limit.
async fn export_collection(
    coll: Collection<Document>,
    dbname: &str,
    collection: &str,
    out_path: &Path,
) -> Result<()> {
    let export_error = |message: String| BackupError::Driver {
        driver: DriverKind::Mongodb.to_string(),
        database: dbname.to_string(),
        message,
    };

    let mut cursor = coll
        .find(doc! {})
        .await
        .map_err(|e| export_error(format!("Failed to query collection '{}': {}", collection, e)))?;

    let mut documents: Vec<Document> = Vec::new();
    while let Some(document) = cursor
        .try_next()
        .await
        .map_err(|e| export_error(format!("Failed to read collection '{}': {}", collection, e)))?
    {
        documents.push(document);
    }

    let json = serde_json::to_vec(&documents).map_err(|e| {
        export_error(format!(
            "Failed to serialize collection '{}': {}",
            collection, e
        ))
    })?;
    tokio::fs::write(out_path, json).await.map_err(|e| {
        export_error(format!(
            "Failed to write export for collection '{}': {}",
            collection, e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_uri_yields_driver_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConfig {
            driver: DriverKind::Mongodb,
            dbname: "app".to_string(),
            host: None,
            user: None,
            password: None,
            port: None,
            uri: None,
        };

        let result = MongoDriver.backup(&db, dir.path()).await;
        assert!(matches!(result, Err(BackupError::Driver { .. })));
    }
}
