use axum::Router;
use axum::routing::{get, patch, post};
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_job))
        .route("/{id}", get(handler::get_job))
        .route("/{id}/status", patch(handler::update_job_status))
        .route("/{id}/start", post(handler::start_job))
}
