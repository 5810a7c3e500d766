use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::clock;

/// A registered source video and where it lives in remote storage.
#[derive(Debug, Serialize, Deserialize, FromRow, Validate, ToSchema, Clone, PartialEq)]
pub struct Video {
    #[validate(
        length(min = 1, message = "Video id is required"),
        custom(function = "crate::common::validators::validate_video_id")
    )]
    pub id: String,
    pub resource_id: String,
    pub file_path: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

impl Video {
    pub fn new(resource_id: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), resource_id, file_path)
    }

    pub fn with_id(
        id: impl Into<String>,
        resource_id: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_id: resource_id.into(),
            file_path: file_path.into(),
            created_at: clock::now_utc(),
        }
    }
}
