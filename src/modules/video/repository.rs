use validator::Validate;

use super::model::Video;
use crate::common::error::{EncoderError, Result};
use crate::infrastructure::db::pool::{Database, with_pool};

const INSERT_VIDEO: &str =
    "INSERT INTO videos (id, resource_id, file_path, created_at) VALUES ($1, $2, $3, $4)";

const FIND_VIDEO: &str =
    "SELECT id, resource_id, file_path, created_at FROM videos WHERE id = $1";

const LIST_VIDEOS: &str =
    "SELECT id, resource_id, file_path, created_at FROM videos ORDER BY created_at DESC";

#[derive(Clone)]
pub struct VideoRepository {
    db: Database,
}

impl VideoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, video: &Video) -> Result<Video> {
        video.validate()?;

        with_pool!(&self.db, |pool| {
            sqlx::query(INSERT_VIDEO)
                .bind(&video.id)
                .bind(&video.resource_id)
                .bind(&video.file_path)
                .bind(video.created_at)
                .execute(pool)
                .await?;
        });

        Ok(video.clone())
    }

    pub async fn find(&self, id: &str) -> Result<Video> {
        let video = with_pool!(&self.db, |pool| {
            sqlx::query_as::<_, Video>(FIND_VIDEO)
                .bind(id)
                .fetch_optional(pool)
                .await?
        });

        video.ok_or_else(|| EncoderError::not_found("video", id))
    }

    pub async fn list(&self) -> Result<Vec<Video>> {
        let videos = with_pool!(&self.db, |pool| {
            sqlx::query_as::<_, Video>(LIST_VIDEOS)
                .fetch_all(pool)
                .await?
        });

        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repository() -> VideoRepository {
        VideoRepository::new(Database::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn insert_then_find_round_trips_every_field() {
        let repo = repository().await;
        let video = Video::new("video", "/path/to/video.mp4");

        repo.insert(&video).await.unwrap();
        let found = repo.find(&video.id).await.unwrap();

        assert_eq!(found, video);
    }

    #[tokio::test]
    async fn find_missing_video_is_not_found() {
        let repo = repository().await;

        let err = repo.find("does-not-exist").await.unwrap_err();
        assert!(matches!(err, EncoderError::NotFound { entity: "video", .. }));
    }

    #[tokio::test]
    async fn duplicate_id_is_a_persistence_error() {
        let repo = repository().await;
        let video = Video::new("video", "/path/to/video.mp4");
        repo.insert(&video).await.unwrap();

        let again = Video::with_id(video.id.clone(), "other", "/other.mp4");
        let err = repo.insert(&again).await.unwrap_err();
        assert!(matches!(err, EncoderError::Persistence(_)));

        let stored = repo.find(&video.id).await.unwrap();
        assert_eq!(stored.file_path, "/path/to/video.mp4");
    }

    #[tokio::test]
    async fn non_uuid_ids_are_not_stored() {
        let repo = repository().await;

        let err = repo
            .insert(&Video::with_id("..", "video", "/path/to/video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, EncoderError::Validation(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_every_video() {
        let repo = repository().await;
        let first = Video::new("batch-1", "a.mp4");
        let second = Video::new("batch-1", "b.mp4");
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let mut ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|v| v.id).collect();
        ids.sort();
        let mut expected = vec![first.id, second.id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
