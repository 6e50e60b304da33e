use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{NoneAsEmptyString, serde_as};
use url::Url;

/// Format the API should answer in. Only `json` responses can be decoded.
#[non_exhaustive]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

/// Input for a new export job.
#[derive(Clone, Debug, bon::Builder)]
pub struct JobRequest {
    #[builder(into)]
    pub job_type: String,
    #[builder(into)]
    pub list: String,
    #[builder(default)]
    pub format: ResponseFormat,
    /// Extra export columns, e.g. `{"vars": {"user_id": 1}}`.
    pub fields: Option<Map<String, Value>>,
}

/// Returned by job submission.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct JobHandle {
    pub job_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub list: String,
    pub status: JobState,
}

/// Server-side job status.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobState {
    Pending,
    Completed,
    #[serde(other)]
    Unknown,
}

/// Snapshot returned by a status check.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct JobStatus {
    pub job_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub list: String,
    pub status: JobState,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub expired: bool,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub export_url: Option<Url>,
}

impl JobStatus {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == JobState::Completed
    }

    /// Completed and the export can still be downloaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.is_completed() && !self.expired
    }

    /// Parses `start_time`, which the API renders as RFC 2822.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.start_time.as_deref())
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.end_time.as_deref())
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(value?).ok()
}
