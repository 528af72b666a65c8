//! Local filesystem helpers for transfers

use std::path::{Path, PathBuf};

use gdrive_core::domain::DriveError;

/// A file or directory found below an upload root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// Path relative to the walked root
    pub relative: PathBuf,
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
}

fn fs_error(path: &Path, error: std::io::Error) -> DriveError {
    DriveError::LocalFilesystem(format!("{}: {error}", path.display()))
}

/// Recursively lists everything below `root`
///
/// Entries are sorted component-wise, so every directory precedes its
/// contents. Symlinks are followed.
pub async fn walk(root: &Path) -> Result<Vec<LocalEntry>, DriveError> {
    let mut entries = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative_dir) = pending.pop() {
        let dir = root.join(&relative_dir);
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| fs_error(&dir, e))?;

        while let Some(entry) = reader.next_entry().await.map_err(|e| fs_error(&dir, e))? {
            let path = entry.path();
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| fs_error(&path, e))?;
            let relative = relative_dir.join(entry.file_name());

            if metadata.is_dir() {
                pending.push(relative.clone());
            }
            entries.push(LocalEntry {
                relative,
                is_dir: metadata.is_dir(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
            });
        }
    }

    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(entries)
}

/// The final component of `path` as an object name
///
/// Relative inputs such as `.` are canonicalized first.
pub async fn object_name(path: &Path) -> Result<String, DriveError> {
    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| fs_error(path, e))?;
    canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            DriveError::InvalidArgument(format!("'{}' has no file name", path.display()))
        })
}

/// Where a download named `name` should be written
///
/// An existing directory receives the file inside it; any other path is
/// taken as the target file itself.
pub async fn download_target(destination: &Path, name: &str) -> PathBuf {
    let is_dir = tokio::fs::metadata(destination)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if is_dir {
        destination.join(sanitize_file_name(name))
    } else {
        destination.to_path_buf()
    }
}

/// Replaces characters that cannot appear in a local file name
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\0' { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
