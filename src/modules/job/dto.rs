use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Video id is required"))]
    pub video_id: String,
    #[validate(length(min = 1, message = "Output path is required"))]
    pub output_bucket_path: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateJobStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    pub error: Option<String>,
}
