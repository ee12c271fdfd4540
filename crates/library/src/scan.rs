//! Directory scanning.

use std::path::{Path, PathBuf};

use modwatch_extract::models::ContentHash;
use tracing::instrument;

use crate::error::Result;
use crate::hash::hash_file;

/// One file found in the mods directory, with its content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub filename: String,
    pub path: PathBuf,
    pub hash: ContentHash,
}

/// Hash every plain file in a mods directory.
///
/// Hidden files and directory-metadata artifacts (`.DS_Store`, `Thumbs.db`,
/// `desktop.ini`) are skipped, as are subdirectories. An unreadable entry
/// is a per-file warning, never fatal: one corrupt download should not
/// abort the report for the rest of the directory. An unreadable directory
/// logs one warning and yields nothing.
#[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
pub async fn scan_dir(dir: impl AsRef<Path>) -> Result<Vec<LocalFile>> {
    let dir = dir.as_ref();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return Ok(Vec::new());
        },
    };
    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "directory listing cut short");
                break;
            },
        };
        let Some(entry) = entry else { break };
        let path = entry.path();
        let Some(filename) = path.file_name().and_then(|name| name.to_str()).map(str::to_string) else {
            tracing::warn!(path = %path.display(), "skipping file with non-UTF-8 name");
            continue;
        };
        if !is_mod_candidate(&path, &filename).await {
            continue;
        }
        match hash_file(&path).await {
            Ok(hash) => files.push(LocalFile { filename, path, hash }),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    // Deterministic report order regardless of directory iteration order.
    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}

/// Pre-filter applied before hashing: plain files only, no hidden files,
/// no platform metadata markers.
async fn is_mod_candidate(path: &Path, filename: &str) -> bool {
    if filename.starts_with('.') || filename.eq_ignore_ascii_case("thumbs.db") || filename.eq_ignore_ascii_case("desktop.ini") {
        return false;
    }
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_file(),
        Err(_) => false,
    }
}
