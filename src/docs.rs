use utoipa::OpenApi;

use crate::modules::job::dto::{CreateJobRequest, UpdateJobStatusRequest};
use crate::modules::job::model::{Job, JobStatus};
use crate::modules::video::dto::CreateVideoRequest;
use crate::modules::video::model::Video;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::video::handler::create_video,
        crate::modules::video::handler::list_videos,
        crate::modules::video::handler::get_video,
        crate::modules::video::handler::list_video_jobs,
        crate::modules::job::handler::create_job,
        crate::modules::job::handler::get_job,
        crate::modules::job::handler::update_job_status,
        crate::modules::job::handler::start_job,
    ),
    components(
        schemas(
            Video, Job, JobStatus,
            CreateVideoRequest, CreateJobRequest, UpdateJobStatusRequest,
        )
    ),
    tags(
        (name = "Videos", description = "Source video registry"),
        (name = "Jobs", description = "Transcoding job lifecycle")
    )
)]
pub struct ApiDoc;
