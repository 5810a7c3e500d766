use axum::Router;
use axum::routing::get;
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_videos).post(handler::create_video))
        .route("/{id}", get(handler::get_video))
        .route("/{id}/jobs", get(handler::list_video_jobs))
}
