//! In-memory directory indices with normalized-name lookup.
//!
//! A [`NameIndex`] is built from one recursive traversal of a directory and
//! maps each normalized file name to the paths sharing it. The
//! [`IndexCache`] keeps one index per directory so repeated searches never
//! re-walk the tree. Entries are never invalidated automatically: the cache
//! is stale-tolerant, and callers force a rebuild with `invalidate` or
//! `clear` after known filesystem changes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::normalize::normalize;

/// Normalized-name index over one directory tree.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl NameIndex {
    /// Build an index with a single recursive walk of `dir`.
    ///
    /// Entries that cannot be read are logged and skipped; the build itself
    /// only fails when the root is not a usable directory.
    pub fn build(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Not a directory: {}", dir.display());
        }

        let mut entries: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let key = normalize(&entry.file_name().to_string_lossy());
            entries.entry(key).or_default().push(entry.into_path());
        }

        Ok(Self { entries })
    }

    /// Paths whose normalized name contains the normalized `query` as a
    /// substring.
    ///
    /// An empty query matches every name. No match yields an empty vec, not
    /// an error.
    pub fn search(&self, query: &str) -> Vec<PathBuf> {
        let needle = normalize(query);

        let mut results = Vec::new();
        for (name, paths) in &self.entries {
            if name.contains(&needle) {
                results.extend(paths.iter().cloned());
            }
        }
        results
    }

    /// Number of distinct normalized names in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no files
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-directory cache of [`NameIndex`] values.
///
/// Owned by whichever component orchestrates a pipeline run and passed to
/// consumers explicitly; there is no process-global instance. Single-thread
/// use only, matching the sequential batch pipeline around it.
#[derive(Debug, Default)]
pub struct IndexCache {
    indices: HashMap<PathBuf, NameIndex>,
}

impl IndexCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The index for `dir`, building it on first use.
    pub fn get(&mut self, dir: &Path) -> Result<&NameIndex> {
        if !self.indices.contains_key(dir) {
            let index = NameIndex::build(dir)
                .with_context(|| format!("Failed to index {}", dir.display()))?;
            self.indices.insert(dir.to_path_buf(), index);
        }

        Ok(&self.indices[dir])
    }

    /// Search `dir` through its cached index, building it on first use.
    pub fn search(&mut self, dir: &Path, query: &str) -> Result<Vec<PathBuf>> {
        Ok(self.get(dir)?.search(query))
    }

    /// Drop the cached index for one directory.
    pub fn invalidate(&mut self, dir: &Path) {
        self.indices.remove(dir);
    }

    /// Drop every cached index (test isolation, or after known tree changes).
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Whether an index is currently held for `dir`.
    pub fn contains(&self, dir: &Path) -> bool {
        self.indices.contains_key(dir)
    }
}
