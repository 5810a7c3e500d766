use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVideoRequest {
    /// Caller-assigned id; a UUID is generated when omitted.
    #[validate(custom(function = "crate::common::validators::validate_video_id"))]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Resource id is required"))]
    pub resource_id: String,
    #[validate(length(min = 1, message = "File path is required"))]
    pub file_path: String,
}
