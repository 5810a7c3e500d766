use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::clock;
use crate::common::error::{EncoderError, Result};
use crate::modules::video::model::Video;

/// Lifecycle states a job moves through while its video is processed.
///
/// The persisted `status` column is an open string; these are the values the
/// processing pipeline writes. Names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum JobStatus {
    Pending,
    Downloading,
    Fragmenting,
    Finishing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Downloading => "Downloading",
            JobStatus::Fragmenting => "Fragmenting",
            JobStatus::Finishing => "Finishing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(JobStatus::Pending),
            "Downloading" => Ok(JobStatus::Downloading),
            "Fragmenting" => Ok(JobStatus::Fragmenting),
            "Finishing" => Ok(JobStatus::Finishing),
            "Completed" => Ok(JobStatus::Completed),
            "Failed" => Ok(JobStatus::Failed),
            other => Err(EncoderError::InvalidStatus(other.to_string())),
        }
    }
}

/// One transcoding task bound to exactly one video.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    #[validate(length(min = 1, message = "Output path is required"))]
    pub output_bucket_path: String,
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    #[validate(nested)]
    pub video: Video,
    pub error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl Job {
    pub fn new(
        output_bucket_path: impl Into<String>,
        status: impl Into<String>,
        video: Video,
    ) -> Result<Self> {
        let now = clock::now_utc();
        let job = Self {
            id: Uuid::new_v4().to_string(),
            output_bucket_path: output_bucket_path.into(),
            status: status.into(),
            video,
            error: None,
            created_at: now,
            updated_at: now,
        };

        job.validate()?;
        Ok(job)
    }

    /// The current status, if it is one the pipeline knows about.
    pub fn known_status(&self) -> Option<JobStatus> {
        self.status.parse().ok()
    }

    pub fn transition(&mut self, status: JobStatus) {
        self.status = status.as_str().to_string();
        self.updated_at = clock::now_utc();
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.transition(JobStatus::Failed);
        self.error = Some(reason.into());
    }
}
