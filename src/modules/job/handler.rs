use super::dto::{CreateJobRequest, UpdateJobStatusRequest};
use super::model::Job;
use super::service::JobService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::error;

/// Create a job for a registered video
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = ApiResponse<Job>),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Video not found")
    ),
    tag = "Jobs"
)]
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> impl IntoResponse {
    match JobService::create(state, payload).await {
        Ok(job) => ApiSuccess::created(job, "Job created successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Get a job and the video it is bound to
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job details", body = ApiResponse<Job>),
        (status = 404, description = "Job not found")
    ),
    tag = "Jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match JobService::get(state, &id).await {
        Ok(job) => ApiSuccess::ok(job, "Job retrieved successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Record a status transition
#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}/status",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    request_body = UpdateJobStatusRequest,
    responses(
        (status = 200, description = "Job updated", body = ApiResponse<Job>),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Job not found")
    ),
    tag = "Jobs"
)]
pub async fn update_job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> impl IntoResponse {
    match JobService::update_status(state, &id, payload).await {
        Ok(job) => ApiSuccess::ok(job, "Job updated successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Download and fragment the job's video in the background
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/start",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 202, description = "Processing started", body = ApiResponse<Job>),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is not Pending")
    ),
    tag = "Jobs"
)]
pub async fn start_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let job = match JobService::claim(&state, &id).await {
        Ok(job) => job,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let tasks = state.tasks.clone();
    let claimed = job.clone();
    tasks.spawn(async move {
        // Failures are already persisted on the job itself
        if let Err(e) = JobService::run(state, claimed).await {
            error!("Background processing of job {} stopped: {}", id, e);
        }
    });

    ApiSuccess::accepted(job, "Job processing started").into_response()
}
