use sqlx::FromRow;
use time::OffsetDateTime;

use super::model::Job;
use crate::common::error::{EncoderError, Result};
use crate::infrastructure::db::pool::{Database, with_pool};
use crate::modules::video::model::Video;

const INSERT_JOB: &str = "INSERT INTO jobs (id, output_bucket_path, status, video_id, error, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)";

const UPDATE_JOB: &str = "UPDATE jobs SET output_bucket_path = $1, status = $2, error = $3, updated_at = $4 WHERE id = $5";

const CLAIM_JOB: &str = "UPDATE jobs SET status = $1, error = $2, updated_at = $3 WHERE id = $4 AND status = $5";

const SELECT_JOB_WITH_VIDEO: &str = r#"
    SELECT j.id, j.output_bucket_path, j.status, j.error, j.created_at, j.updated_at,
           v.id AS video_id, v.resource_id AS video_resource_id,
           v.file_path AS video_file_path, v.created_at AS video_created_at
    FROM jobs j
    JOIN videos v ON v.id = j.video_id
"#;

/// A job row joined with the video it is bound to.
#[derive(FromRow)]
struct JobRow {
    id: String,
    output_bucket_path: String,
    status: String,
    error: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    video_id: String,
    video_resource_id: String,
    video_file_path: String,
    video_created_at: OffsetDateTime,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            output_bucket_path: row.output_bucket_path,
            status: row.status,
            video: Video {
                id: row.video_id,
                resource_id: row.video_resource_id,
                file_path: row.video_file_path,
                created_at: row.video_created_at,
            },
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct JobRepository {
    db: Database,
}

impl JobRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, job: &Job) -> Result<Job> {
        with_pool!(&self.db, |pool| {
            sqlx::query(INSERT_JOB)
                .bind(&job.id)
                .bind(&job.output_bucket_path)
                .bind(&job.status)
                .bind(&job.video.id)
                .bind(&job.error)
                .bind(job.created_at)
                .bind(job.updated_at)
                .execute(pool)
                .await?;
        });

        Ok(job.clone())
    }

    /// Persists the mutable fields of `job` and returns the stored row. The id
    /// and the bound video are never rewritten.
    pub async fn update(&self, job: &Job) -> Result<Job> {
        let rows_affected = with_pool!(&self.db, |pool| {
            sqlx::query(UPDATE_JOB)
                .bind(&job.output_bucket_path)
                .bind(&job.status)
                .bind(&job.error)
                .bind(job.updated_at)
                .bind(&job.id)
                .execute(pool)
                .await?
                .rows_affected()
        });

        if rows_affected == 0 {
            return Err(EncoderError::not_found("job", &job.id));
        }

        self.find(&job.id).await
    }

    /// Writes the status of `job` only if the stored status is still
    /// `expected`. Returns whether the row changed.
    pub async fn compare_and_set_status(&self, job: &Job, expected: &str) -> Result<bool> {
        let rows_affected = with_pool!(&self.db, |pool| {
            sqlx::query(CLAIM_JOB)
                .bind(&job.status)
                .bind(&job.error)
                .bind(job.updated_at)
                .bind(&job.id)
                .bind(expected)
                .execute(pool)
                .await?
                .rows_affected()
        });

        Ok(rows_affected > 0)
    }

    pub async fn find(&self, id: &str) -> Result<Job> {
        let query = format!("{} WHERE j.id = $1", SELECT_JOB_WITH_VIDEO);
        let row = with_pool!(&self.db, |pool| {
            sqlx::query_as::<_, JobRow>(&query)
                .bind(id)
                .fetch_optional(pool)
                .await?
        });

        row.map(Job::from)
            .ok_or_else(|| EncoderError::not_found("job", id))
    }

    pub async fn list_by_video(&self, video_id: &str) -> Result<Vec<Job>> {
        let query = format!(
            "{} WHERE j.video_id = $1 ORDER BY j.created_at ASC",
            SELECT_JOB_WITH_VIDEO
        );
        let rows = with_pool!(&self.db, |pool| {
            sqlx::query_as::<_, JobRow>(&query)
                .bind(video_id)
                .fetch_all(pool)
                .await?
        });

        Ok(rows.into_iter().map(Job::from).collect())
    }
}
