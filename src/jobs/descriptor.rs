//! Job descriptor files and their naming convention.
//!
//! A job lives in a single JSON file named
//! `<title>_<TAG>_<YYYYMMDDHHMMSS>.json`. The tag carries the job state and
//! the 14-digit timestamp orders versions of the same title, so the file
//! name is itself the state machine: advancing a job rewrites the tag while
//! keeping title and timestamp.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `status` value of a job waiting to be rendered.
pub const STATUS_PENDING: &str = "procesar";

/// `status` value of a finished job.
pub const STATUS_DONE: &str = "procesado";

/// Timestamp format embedded in job file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Job state as encoded in the file-name tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Queued for rendering (`RENDERIZAR`).
    Render,

    /// Rendered and acknowledged (`PROCESADO`).
    Processed,
}

impl JobState {
    /// File-name tag for this state.
    pub fn tag(self) -> &'static str {
        match self {
            JobState::Render => "RENDERIZAR",
            JobState::Processed => "PROCESADO",
        }
    }
}

/// Why a file name could not be read as a job file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FileNameError {
    /// The name does not follow `<title>_<TAG>_<14 digits>.json`.
    #[error("not a job file name")]
    Pattern,

    /// The name matches the pattern but the digits are not a real datetime.
    #[error("invalid timestamp in job file name")]
    Timestamp,
}

/// Structured form of a job file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFileName {
    /// Logical title grouping versions of the same job.
    pub title: String,

    /// State carried by the file-name tag.
    pub state: JobState,

    /// Version timestamp embedded in the name.
    pub timestamp: NaiveDateTime,
}

impl JobFileName {
    /// Parse `<title>_<TAG>_<YYYYMMDDHHMMSS>.json`.
    ///
    /// Titles may themselves contain underscores; the tag and timestamp are
    /// anchored at the end of the name.
    pub fn parse(name: &str) -> Result<Self, FileNameError> {
        let stem = name.strip_suffix(".json").ok_or(FileNameError::Pattern)?;

        let bytes = stem.as_bytes();
        if bytes.len() < 14 || !bytes[bytes.len() - 14..].iter().all(u8::is_ascii_digit) {
            return Err(FileNameError::Pattern);
        }
        let (head, digits) = stem.split_at(stem.len() - 14);

        let (title, state) = [JobState::Render, JobState::Processed]
            .into_iter()
            .find_map(|state| {
                head.strip_suffix(&format!("_{}_", state.tag()))
                    .map(|title| (title, state))
            })
            .ok_or(FileNameError::Pattern)?;

        let timestamp = parse_timestamp(digits).ok_or(FileNameError::Timestamp)?;

        Ok(Self {
            title: title.to_string(),
            state,
            timestamp,
        })
    }

    /// Render back to the on-disk file name.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.json",
            self.title,
            self.state.tag(),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }

    /// The same job under a different state tag.
    pub fn with_state(&self, state: JobState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}

/// Parse 14 digits as `YYYYMMDDHHMMSS`, rejecting impossible dates.
fn parse_timestamp(digits: &str) -> Option<NaiveDateTime> {
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    let hour: u32 = digits[8..10].parse().ok()?;
    let minute: u32 = digits[10..12].parse().ok()?;
    let second: u32 = digits[12..14].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// JSON body of a job file.
///
/// Only `status` and `content` are interpreted; any other fields ride along
/// unchanged when the file is rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Free-text job state; see [`STATUS_PENDING`] and [`STATUS_DONE`].
    #[serde(default)]
    pub status: String,

    /// Script payload handed to the render pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Fields not interpreted here, preserved across rewrites.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl JobDescriptor {
    /// Whether the job is still waiting to be rendered.
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_PENDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let name = "Mi Historia_RENDERIZAR_20240101123456.json";
        let job = JobFileName::parse(name).unwrap();

        assert_eq!(job.title, "Mi Historia");
        assert_eq!(job.state, JobState::Render);
        assert_eq!(job.file_name(), name);
    }

    #[test]
    fn test_parse_title_with_underscores() {
        let job = JobFileName::parse("a_b_c_RENDERIZAR_20240101000000.json").unwrap();
        assert_eq!(job.title, "a_b_c");
    }

    #[test]
    fn test_parse_greedy_title() {
        // The tag match anchors at the end, like the original convention
        let job = JobFileName::parse("x_RENDERIZAR_y_RENDERIZAR_20240101000000.json").unwrap();
        assert_eq!(job.title, "x_RENDERIZAR_y");
    }

    #[test]
    fn test_parse_processed_tag() {
        let job = JobFileName::parse("t_PROCESADO_20240101000000.json").unwrap();
        assert_eq!(job.state, JobState::Processed);
    }

    #[test]
    fn test_parse_rejects_non_matching_names() {
        for name in [
            "notes.txt",
            "t_RENDERIZAR_2024.json",
            "t_RENDERIZAR_2024010100000a.json",
            "t_OTRO_20240101000000.json",
            "t_renderizar_20240101000000.json",
            "t_RENDERIZAR_20240101000000.JSON",
        ] {
            assert_eq!(JobFileName::parse(name), Err(FileNameError::Pattern), "{name}");
        }
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert_eq!(
            JobFileName::parse("t_RENDERIZAR_20241399000000.json"),
            Err(FileNameError::Timestamp)
        );
        assert_eq!(
            JobFileName::parse("t_RENDERIZAR_20240230000000.json"),
            Err(FileNameError::Timestamp)
        );
    }

    #[test]
    fn test_with_state_keeps_title_and_timestamp() {
        let job = JobFileName::parse("t_RENDERIZAR_20240101000000.json").unwrap();
        let processed = job.with_state(JobState::Processed);

        assert_eq!(processed.file_name(), "t_PROCESADO_20240101000000.json");
        assert_eq!(processed.timestamp, job.timestamp);
    }

    #[test]
    fn test_descriptor_pending_is_case_insensitive() {
        let descriptor: JobDescriptor =
            serde_json::from_str(r#"{"status": "Procesar", "content": "x"}"#).unwrap();
        assert!(descriptor.is_pending());
    }

    #[test]
    fn test_descriptor_preserves_unknown_fields() {
        let raw = r#"{"status": "procesar", "content": "x", "voice": "es", "takes": 3}"#;
        let mut descriptor: JobDescriptor = serde_json::from_str(raw).unwrap();
        descriptor.status = STATUS_DONE.to_string();

        let out = serde_json::to_string(&descriptor).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "procesado");
        assert_eq!(value["content"], "x");
        assert_eq!(value["voice"], "es");
        assert_eq!(value["takes"], 3);
    }

    #[test]
    fn test_descriptor_tolerates_missing_fields() {
        let descriptor: JobDescriptor = serde_json::from_str("{}").unwrap();
        assert!(!descriptor.is_pending());
        assert!(descriptor.content.is_none());
    }
}
