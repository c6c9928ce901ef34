//! Lifecycle operations over a directory of job files.
//!
//! Every operation is best-effort across the directory: a failure on one
//! file is logged, recorded in the returned report and the remaining files
//! are still processed. Only a top-level directory error aborts an
//! operation. File operations are not transactional; a crash between the
//! rewrite and the delete in [`JobStore::mark_processed`] can leave both
//! files behind, and re-runs are safe.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

use super::descriptor::{FileNameError, JobDescriptor, JobFileName, JobState, STATUS_DONE};

/// Errors that abort a whole store operation.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("Job directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single file was skipped during a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid timestamp in file name")]
    InvalidTimestamp,

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// A per-file failure recorded in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Name of the file that was skipped.
    pub file_name: String,

    /// What went wrong with it.
    pub kind: FailureKind,
}

/// Outcome of [`JobStore::retain_latest`].
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Surviving file names, one per title.
    pub retained: BTreeSet<String>,

    /// File names deleted as superseded versions.
    pub deleted: Vec<String>,

    /// Files skipped or left behind by per-file errors.
    pub failures: Vec<JobFailure>,
}

/// Outcome of [`JobStore::mark_processed`].
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    /// `(original, renamed)` file-name pairs.
    pub processed: Vec<(String, String)>,

    /// Files skipped by per-file errors.
    pub failures: Vec<JobFailure>,
}

/// Outcome of [`JobStore::pending`].
#[derive(Debug, Clone, Default)]
pub struct PendingReport {
    /// `content` payload of each matching job.
    pub scripts: Vec<String>,

    /// Files skipped by per-file errors.
    pub failures: Vec<JobFailure>,
}

/// Directory-backed store of job descriptor files.
#[derive(Debug, Clone)]
pub struct JobStore {
    dir: PathBuf,
}

impl JobStore {
    /// Create a store over `dir`. The directory is read lazily per
    /// operation, never held open.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store operates on.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keep only the newest `RENDERIZAR` file per title, deleting the rest.
    ///
    /// Newest means the latest file-name timestamp; a timestamp tie goes to
    /// the lexicographically greater file name. Names matching the pattern
    /// whose digits are not a real datetime are reported and left in place,
    /// and names that do not follow the convention are not touched at all.
    pub fn retain_latest(&self) -> Result<CleanupReport, JobStoreError> {
        let mut report = CleanupReport::default();
        let mut latest: HashMap<String, (String, NaiveDateTime)> = HashMap::new();
        let mut candidates: Vec<String> = Vec::new();

        for name in self.list_names()? {
            match JobFileName::parse(&name) {
                Ok(job) if job.state == JobState::Render => {
                    let newer = match latest.get(&job.title) {
                        Some((held_name, held_ts)) => {
                            (job.timestamp, name.as_str()) > (*held_ts, held_name.as_str())
                        }
                        None => true,
                    };
                    if newer {
                        latest.insert(job.title.clone(), (name.clone(), job.timestamp));
                    }
                    candidates.push(name);
                }
                Ok(_) => {}
                Err(FileNameError::Timestamp) => {
                    warn!("Skipping {}: unparseable timestamp", name);
                    report.failures.push(JobFailure {
                        file_name: name,
                        kind: FailureKind::InvalidTimestamp,
                    });
                }
                Err(FileNameError::Pattern) => {}
            }
        }

        report.retained = latest.into_values().map(|(name, _)| name).collect();

        for name in candidates {
            if report.retained.contains(&name) {
                continue;
            }
            match fs::remove_file(self.dir.join(&name)) {
                Ok(()) => {
                    info!("Deleted superseded job file {}", name);
                    report.deleted.push(name);
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", name, e);
                    report.failures.push(JobFailure {
                        file_name: name,
                        kind: FailureKind::Io(e.to_string()),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Flip every `RENDERIZAR` file to `PROCESADO`.
    ///
    /// Rewrites the JSON body with `status` set to `"procesado"`, writes it
    /// under the renamed file and removes the original.
    pub fn mark_processed(&self) -> Result<ProcessReport, JobStoreError> {
        let mut report = ProcessReport::default();

        for name in self.list_names()? {
            let job = match JobFileName::parse(&name) {
                Ok(job) if job.state == JobState::Render => job,
                Ok(_) => continue,
                Err(FileNameError::Timestamp) => {
                    warn!("Skipping {}: unparseable timestamp", name);
                    report.failures.push(JobFailure {
                        file_name: name,
                        kind: FailureKind::InvalidTimestamp,
                    });
                    continue;
                }
                Err(FileNameError::Pattern) => continue,
            };

            match self.process_one(&name, &job) {
                Ok(new_name) => {
                    info!("Marked {} as processed ({})", name, new_name);
                    report.processed.push((name, new_name));
                }
                Err(kind) => {
                    warn!("Failed to process {}: {}", name, kind);
                    report.failures.push(JobFailure {
                        file_name: name,
                        kind,
                    });
                }
            }
        }

        Ok(report)
    }

    fn process_one(&self, name: &str, job: &JobFileName) -> Result<String, FailureKind> {
        let path = self.dir.join(name);

        let raw = fs::read_to_string(&path).map_err(|e| FailureKind::Io(e.to_string()))?;
        let mut descriptor: JobDescriptor =
            serde_json::from_str(&raw).map_err(|e| FailureKind::Json(e.to_string()))?;
        descriptor.status = STATUS_DONE.to_string();

        let new_name = job.with_state(JobState::Processed).file_name();
        let body = serde_json::to_string_pretty(&descriptor)
            .map_err(|e| FailureKind::Json(e.to_string()))?;
        fs::write(self.dir.join(&new_name), body).map_err(|e| FailureKind::Io(e.to_string()))?;
        fs::remove_file(&path).map_err(|e| FailureKind::Io(e.to_string()))?;

        Ok(new_name)
    }

    /// Collect the `content` of jobs whose status is still `"procesar"`.
    ///
    /// Considers files whose name ends in `.json` and contains the
    /// `RENDERIZAR` tag in any casing. With `latest_only` only the entry
    /// with the greatest modification time is returned; an mtime tie goes
    /// to the greater file name, so the result is deterministic for a given
    /// filesystem state. Without it, contents come back in file-name order.
    pub fn pending(&self, latest_only: bool) -> Result<PendingReport, JobStoreError> {
        let mut report = PendingReport::default();
        let mut found: Vec<(SystemTime, String, String)> = Vec::new();

        for name in self.list_names()? {
            if !name.ends_with(".json")
                || !name.to_ascii_uppercase().contains(JobState::Render.tag())
            {
                continue;
            }

            match self.read_pending(&name) {
                Ok(Some((mtime, content))) => found.push((mtime, name, content)),
                Ok(None) => {}
                Err(kind) => {
                    warn!("Failed to read {}: {}", name, kind);
                    report.failures.push(JobFailure {
                        file_name: name,
                        kind,
                    });
                }
            }
        }

        if latest_only {
            let newest = found
                .into_iter()
                .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            if let Some((_, _, content)) = newest {
                report.scripts.push(content);
            }
        } else {
            // list_names is sorted, so contents come out in file-name order
            report.scripts = found.into_iter().map(|(_, _, content)| content).collect();
        }

        Ok(report)
    }

    fn read_pending(&self, name: &str) -> Result<Option<(SystemTime, String)>, FailureKind> {
        let path = self.dir.join(name);

        let raw = fs::read_to_string(&path).map_err(|e| FailureKind::Io(e.to_string()))?;
        let descriptor: JobDescriptor =
            serde_json::from_str(&raw).map_err(|e| FailureKind::Json(e.to_string()))?;
        if !descriptor.is_pending() {
            return Ok(None);
        }

        let mtime = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| FailureKind::Io(e.to_string()))?;

        Ok(Some((mtime, descriptor.content.unwrap_or_default())))
    }

    /// Sorted file names in the job directory.
    fn list_names(&self) -> Result<Vec<String>, JobStoreError> {
        if !self.dir.is_dir() {
            return Err(JobStoreError::DirectoryNotFound(self.dir.clone()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_job(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = JobStore::new(temp.path().join("nope"));
        assert!(matches!(
            store.retain_latest(),
            Err(JobStoreError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_retain_latest_on_empty_directory() {
        let temp = TempDir::new().unwrap();
        let store = JobStore::new(temp.path());

        let report = store.retain_latest().unwrap();
        assert!(report.retained.is_empty());
        assert!(report.deleted.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_mark_processed_reports_pairs() {
        let temp = TempDir::new().unwrap();
        write_job(
            temp.path(),
            "t_RENDERIZAR_20240101000000.json",
            r#"{"status": "procesar", "content": "x"}"#,
        );

        let store = JobStore::new(temp.path());
        let report = store.mark_processed().unwrap();

        assert_eq!(
            report.processed,
            vec![(
                "t_RENDERIZAR_20240101000000.json".to_string(),
                "t_PROCESADO_20240101000000.json".to_string()
            )]
        );
    }

    #[test]
    fn test_pending_ignores_processed_status() {
        let temp = TempDir::new().unwrap();
        write_job(
            temp.path(),
            "t_RENDERIZAR_20240101000000.json",
            r#"{"status": "procesado", "content": "x"}"#,
        );

        let store = JobStore::new(temp.path());
        let report = store.pending(false).unwrap();
        assert!(report.scripts.is_empty());
        assert!(report.failures.is_empty());
    }
}
