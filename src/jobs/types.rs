use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Backend-issued status code for an extraction job.
///
/// The backend owns these transitions; the client only decodes and displays
/// them. Codes outside the known set decode as [`JobStatus::Other`] rather
/// than failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum JobStatus {
    Waiting,
    Completed,
    Running,
    BuildingWorkbook,
    LookupLimitExceeded,
    Killed,
    Other(i32),
}

impl JobStatus {
    /// The wire code the backend reported.
    pub fn code(self) -> i32 {
        match self {
            Self::Waiting => 0,
            Self::Completed => 1,
            Self::Running => 2,
            Self::BuildingWorkbook => 3,
            Self::LookupLimitExceeded => -1,
            Self::Killed => -9,
            Self::Other(code) => code,
        }
    }

    /// Whether the backend will never advance this job again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::LookupLimitExceeded | Self::Killed)
    }
}

impl From<i32> for JobStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Waiting,
            1 => Self::Completed,
            2 => Self::Running,
            3 => Self::BuildingWorkbook,
            -1 => Self::LookupLimitExceeded,
            -9 => Self::Killed,
            other => Self::Other(other),
        }
    }
}

impl From<JobStatus> for i32 {
    fn from(status: JobStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Completed => write!(f, "completed"),
            Self::Running => write!(f, "running"),
            Self::BuildingWorkbook => write!(f, "building workbook"),
            Self::LookupLimitExceeded => write!(f, "lookup limit exceeded"),
            Self::Killed => write!(f, "killed"),
            Self::Other(code) => write!(f, "status {code}"),
        }
    }
}

/// One row of the backend's work list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub filename: String,
    /// Upload dedup tag the backend prefixes stored files with.
    #[serde(default)]
    pub file_hashcode: Option<String>,
    #[serde(default, with = "backend_datetime")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, with = "backend_datetime")]
    pub end_time: Option<NaiveDateTime>,
    /// Empty until the backend has produced a result workbook.
    #[serde(default)]
    pub download_name: Option<String>,
    pub status_code: JobStatus,
    #[serde(default)]
    pub author: Option<String>,
}

impl Job {
    /// Name of the downloadable artifact, once the backend has produced one.
    pub fn result_file(&self) -> Option<&str> {
        self.download_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Live progress for a single job, as reported by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub filtering_total: Option<i32>,
    #[serde(default)]
    pub filtering_progress: Option<i32>,
    #[serde(default)]
    pub excel_total: Option<i32>,
    #[serde(default)]
    pub excel_progress: Option<i32>,
    pub status_code: JobStatus,
    #[serde(default)]
    pub author: Option<String>,
}

/// Processing knobs attached to a spreadsheet upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitParameters {
    /// Cross-check keywords against the external registry lookup.
    pub use_external_lookup: bool,
    pub search_count: i32,
    pub seller_count_min: i32,
    pub seller_count_max: i32,
}

impl Default for SubmitParameters {
    /// Mirrors the backend's normalization constants, so defaulted uploads
    /// and out-of-range values land on the same effective settings.
    fn default() -> Self {
        Self {
            use_external_lookup: false,
            search_count: 1000,
            seller_count_min: 0,
            seller_count_max: 5000,
        }
    }
}

/// Timestamps in the backend's `yyyy-MM-dd HH:mm:ss` rendering.
mod backend_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(text) => NaiveDateTime::parse_from_str(&text, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
