use super::dto::CreateVideoRequest;
use super::model::Video;
use super::repository::VideoRepository;
use crate::common::error::EncoderError;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::modules::job::model::Job;
use crate::modules::job::service::JobService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

/// Register a source video
#[utoipa::path(
    post,
    path = "/api/v1/videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video registered", body = ApiResponse<Video>),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Video id already registered"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Videos"
)]
pub async fn create_video(
    State(state): State<AppState>,
    Json(payload): Json<CreateVideoRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return ApiError::from(EncoderError::from(e)).into_response();
    }

    let video = match payload.id {
        Some(id) => Video::with_id(id, payload.resource_id, payload.file_path),
        None => Video::new(payload.resource_id, payload.file_path),
    };

    match VideoRepository::new(state.db).insert(&video).await {
        Ok(video) => ApiSuccess::created(video, "Video registered successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List registered videos
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    responses(
        (status = 200, description = "List of videos", body = ApiResponse<Vec<Video>>)
    ),
    tag = "Videos"
)]
pub async fn list_videos(State(state): State<AppState>) -> impl IntoResponse {
    match VideoRepository::new(state.db).list().await {
        Ok(videos) => ApiSuccess::ok(videos, "Videos retrieved successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Get video by ID
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video details", body = ApiResponse<Video>),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos"
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match VideoRepository::new(state.db).find(&id).await {
        Ok(video) => ApiSuccess::ok(video, "Video retrieved successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List the jobs of a video
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}/jobs",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Jobs of the video", body = ApiResponse<Vec<Job>>),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos"
)]
pub async fn list_video_jobs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match JobService::list_for_video(state, &id).await {
        Ok(jobs) => ApiSuccess::ok(jobs, "Jobs retrieved successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
