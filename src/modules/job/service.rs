use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use validator::Validate;

use super::dto::{CreateJobRequest, UpdateJobStatusRequest};
use super::model::{Job, JobStatus};
use super::repository::JobRepository;
use crate::common::clock;
use crate::common::error::{EncoderError, Result};
use crate::modules::video::repository::VideoRepository;
use crate::modules::video::service::VideoService;
use crate::state::AppState;

pub struct JobService;

impl JobService {
    pub async fn create(state: AppState, req: CreateJobRequest) -> Result<Job> {
        req.validate()?;

        let video = VideoRepository::new(state.db.clone())
            .find(&req.video_id)
            .await?;
        let job = Job::new(req.output_bucket_path, JobStatus::Pending.as_str(), video)?;

        JobRepository::new(state.db).insert(&job).await
    }

    pub async fn get(state: AppState, id: &str) -> Result<Job> {
        JobRepository::new(state.db).find(id).await
    }

    pub async fn list_for_video(state: AppState, video_id: &str) -> Result<Vec<Job>> {
        // Distinguish "unknown video" from "video without jobs"
        VideoRepository::new(state.db.clone()).find(video_id).await?;
        JobRepository::new(state.db).list_by_video(video_id).await
    }

    /// Caller-driven transition. Any non-empty status is accepted.
    pub async fn update_status(
        state: AppState,
        id: &str,
        req: UpdateJobStatusRequest,
    ) -> Result<Job> {
        req.validate()?;

        let jobs = JobRepository::new(state.db);
        let mut job = jobs.find(id).await?;
        job.status = req.status;
        job.error = req.error;
        job.updated_at = clock::now_utc();

        jobs.update(&job).await
    }

    /// Moves a `Pending` job to `Downloading` in one conditional write, so a
    /// job is only ever processed once. Any other status is a conflict.
    pub async fn claim(state: &AppState, id: &str) -> Result<Job> {
        let jobs = JobRepository::new(state.db.clone());
        let mut job = jobs.find(id).await?;

        if job.known_status() != Some(JobStatus::Pending) {
            return Err(EncoderError::Conflict(format!(
                "job {} is {}; only Pending jobs can be started",
                job.id, job.status
            )));
        }

        job.transition(JobStatus::Downloading);
        if !jobs
            .compare_and_set_status(&job, JobStatus::Pending.as_str())
            .await?
        {
            return Err(EncoderError::Conflict(format!(
                "job {} has already been started",
                job.id
            )));
        }

        info!("Job {} -> {}", job.id, JobStatus::Downloading);
        Ok(job)
    }

    /// Claims the job and runs the whole pipeline for it.
    pub async fn start(state: AppState, id: &str) -> Result<Job> {
        let job = Self::claim(&state, id).await?;
        Self::run(state, job).await
    }

    /// Runs the pipeline for a claimed job, persisting every transition.
    ///
    /// When a step fails, local files are removed and the job is explicitly
    /// moved to `Failed` with the error text before the error is handed back.
    pub async fn run(state: AppState, mut job: Job) -> Result<Job> {
        let jobs = JobRepository::new(state.db.clone());
        let mut video_service = VideoService::new(
            VideoRepository::new(state.db.clone()),
            state.storage.clone(),
            state.fragmenter.clone(),
            state.config.local_storage_path.clone(),
        );

        info!("🎥 Starting job {} for video {}", job.id, job.video.id);

        let outcome = match video_service.bind(job.video.clone()) {
            Ok(()) => Self::process(&state, &jobs, &mut job, &mut video_service).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!("✅ Job {} completed", job.id);
                Ok(job)
            }
            Err(e) => {
                error!("❌ Job {} failed: {}", job.id, e);
                if let Err(cleanup) = video_service.finish().await {
                    warn!("Could not clean up after job {}: {}", job.id, cleanup);
                }
                Self::fail(&jobs, &mut job, &e).await;
                Err(e)
            }
        }
    }

    async fn process(
        state: &AppState,
        jobs: &JobRepository,
        job: &mut Job,
        video_service: &mut VideoService,
    ) -> Result<()> {
        let shutdown = &state.shutdown;

        cancellable(shutdown, video_service.download(&state.config.input_bucket)).await?;

        Self::transition(jobs, job, JobStatus::Fragmenting).await?;
        cancellable(shutdown, video_service.fragment()).await?;

        Self::transition(jobs, job, JobStatus::Finishing).await?;
        video_service.finish().await?;

        Self::transition(jobs, job, JobStatus::Completed).await?;
        Ok(())
    }

    async fn transition(jobs: &JobRepository, job: &mut Job, status: JobStatus) -> Result<()> {
        job.transition(status);
        jobs.update(job).await?;
        info!("Job {} -> {}", job.id, status);
        Ok(())
    }

    /// Persists `Failed` with the error text. A failure to persist is logged;
    /// the job keeps its last stored status.
    pub async fn fail(jobs: &JobRepository, job: &mut Job, err: &EncoderError) {
        job.fail(err.to_string());
        if let Err(e) = jobs.update(job).await {
            warn!("Could not record failure of job {}: {}", job.id, e);
        }
    }
}

async fn cancellable<T>(
    token: &CancellationToken,
    step: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(EncoderError::Cancelled),
        result = step => result,
    }
}
