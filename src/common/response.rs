use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::EncoderError;

/// JSON envelope shared by every endpoint: `{status, message, data}`.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

pub struct ApiSuccess<T> {
    code: StatusCode,
    body: ApiResponse<T>,
}

impl<T: Serialize> ApiSuccess<T> {
    fn with_code(code: StatusCode, data: T, message: &str) -> Self {
        Self {
            code,
            body: ApiResponse::success(data, message),
        }
    }

    pub fn ok(data: T, message: &str) -> Self {
        Self::with_code(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: &str) -> Self {
        Self::with_code(StatusCode::CREATED, data, message)
    }

    /// Work was handed to a background task.
    pub fn accepted(data: T, message: &str) -> Self {
        Self::with_code(StatusCode::ACCEPTED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self.body)).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code, Json(ApiResponse::error(self.message))).into_response()
    }
}

fn status_code(err: &EncoderError) -> StatusCode {
    match err {
        EncoderError::Validation(_)
        | EncoderError::InvalidStatus(_)
        | EncoderError::InvalidVideoId(_) => StatusCode::BAD_REQUEST,
        EncoderError::NotFound { .. } => StatusCode::NOT_FOUND,
        EncoderError::Conflict(_) => StatusCode::CONFLICT,
        EncoderError::Persistence(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<EncoderError> for ApiError {
    fn from(err: EncoderError) -> Self {
        Self {
            code: status_code(&err),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::pool::Database;
    use crate::modules::video::model::Video;
    use crate::modules::video::repository::VideoRepository;

    #[test]
    fn caller_errors_map_to_client_statuses() {
        let cases = [
            (EncoderError::InvalidStatus("done".into()), StatusCode::BAD_REQUEST),
            (EncoderError::InvalidVideoId("..".into()), StatusCode::BAD_REQUEST),
            (EncoderError::not_found("job", "x"), StatusCode::NOT_FOUND),
            (EncoderError::Conflict("job x is Completed".into()), StatusCode::CONFLICT),
            (EncoderError::Download("NoSuchKey".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).code, expected);
        }
    }

    #[tokio::test]
    async fn duplicate_video_is_a_conflict() {
        let repo = VideoRepository::new(Database::in_memory().await.unwrap());
        let video = Video::new("video", "/path/to/video.mp4");
        repo.insert(&video).await.unwrap();

        let err = repo.insert(&video).await.unwrap_err();
        assert_eq!(ApiError::from(err).code, StatusCode::CONFLICT);
    }
}
