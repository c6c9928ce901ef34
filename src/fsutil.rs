//! Small filesystem helpers shared by the pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Every file under `dir`, oldest first.
///
/// Ordering uses the creation time where the platform records one, falling
/// back to the modification time; ties fall back to the path so the order
/// is stable for a fixed tree.
pub fn folder_contents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let meta = entry
            .metadata()
            .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
        let stamp = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((stamp, entry.into_path()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Move `file` into `dest_dir` under `new_name`, returning the new path.
///
/// Falls back to copy-and-remove when a plain rename crosses devices.
pub fn move_into(file: &Path, dest_dir: &Path, new_name: &str) -> Result<PathBuf> {
    let target = dest_dir.join(new_name);

    if fs::rename(file, &target).is_err() {
        fs::copy(file, &target).with_context(|| {
            format!("Failed to copy {} to {}", file.display(), target.display())
        })?;
        fs::remove_file(file).with_context(|| format!("Failed to remove {}", file.display()))?;
    }

    Ok(target)
}
