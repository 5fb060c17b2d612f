// backuptool/src/backup/archive.rs
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{BackupError, Result};

/// Creates a zip archive from a directory.
///
/// Paths inside the archive are relative to `source_dir`, directory entries
/// included, so extracting the archive reproduces the original tree.
pub fn compress_dir(source_dir: &Path, dest_zip: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(BackupError::Archive(format!(
            "Source for compression is not a directory: {}",
            source_dir.display()
        )));
    }

    let file = File::create(dest_zip).map_err(|e| {
        BackupError::Archive(format!(
            "Failed to create archive file {}: {}",
            dest_zip.display(),
            e
        ))
    })?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(|e| {
            BackupError::Archive(format!(
                "Failed to walk directory {}: {}",
                source_dir.display(),
                e
            ))
        })?;
        let path = entry.path();
        let name = path.strip_prefix(source_dir).map_err(|e| {
            BackupError::Archive(format!(
                "Failed to strip prefix {} from {}: {}",
                source_dir.display(),
                path.display(),
                e
            ))
        })?;

        // Skip the root directory itself.
        if name.as_os_str().is_empty() {
            continue;
        }
        let name = name.to_string_lossy().into_owned();

        if path.is_dir() {
            zip.add_directory(name, options)
                .map_err(|e| BackupError::Archive(format!("Failed to add directory: {}", e)))?;
        } else if path.is_file() {
            zip.start_file(name, options).map_err(|e| {
                BackupError::Archive(format!(
                    "Failed to start entry for {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let mut f = File::open(path).map_err(|e| {
                BackupError::Archive(format!("Failed to open {}: {}", path.display(), e))
            })?;
            io::copy(&mut f, &mut zip).map_err(|e| {
                BackupError::Archive(format!(
                    "Failed to write {} into archive: {}",
                    path.display(),
                    e
                ))
            })?;
        }
    }

    zip.finish().map_err(|e| {
        BackupError::Archive(format!(
            "Failed to finish archive {}: {}",
            dest_zip.display(),
            e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_round_trip_reproduces_tree() -> anyhow::Result<()> {
        let src = tempfile::tempdir()?;
        fs::write(src.path().join("a.txt"), b"alpha")?;
        fs::create_dir(src.path().join("nested"))?;
        fs::write(src.path().join("nested/b.json"), b"{\"k\":1}")?;

        let dest = tempfile::tempdir()?;
        let zip_path = dest.path().join("out.zip");
        compress_dir(src.path(), &zip_path)?;

        let extracted = tempfile::tempdir()?;
        let mut archive = zip::ZipArchive::new(File::open(&zip_path)?)?;
        archive.extract(extracted.path())?;

        assert_eq!(fs::read(extracted.path().join("a.txt"))?, b"alpha");
        assert_eq!(fs::read(extracted.path().join("nested/b.json"))?, b"{\"k\":1}");
        Ok(())
    }

    #[test]
    fn test_empty_directory_still_produces_archive() -> anyhow::Result<()> {
        let src = tempfile::tempdir()?;
        let dest = tempfile::tempdir()?;
        let zip_path = dest.path().join("empty.zip");

        compress_dir(src.path(), &zip_path)?;
        assert!(zip_path.is_file());

        let archive = zip::ZipArchive::new(File::open(&zip_path)?)?;
        assert_eq!(archive.len(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_source_fails() {
        let dest = tempfile::tempdir().unwrap();
        let result = compress_dir(
            Path::new("/nonexistent/source"),
            &dest.path().join("out.zip"),
        );
        assert!(matches!(result, Err(BackupError::Archive(_))));
    }
}
