use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::model::Video;
use super::repository::VideoRepository;
use crate::common::error::{EncoderError, Result};
use crate::common::validators::is_video_id;
use crate::infrastructure::media::Fragmenter;
use crate::infrastructure::storage::ObjectStorage;

/// Downloads and fragments a single video in a local working directory.
///
/// One instance works on one video at a time and must not be shared between
/// concurrent callers.
pub struct VideoService {
    video_repository: VideoRepository,
    storage: Arc<dyn ObjectStorage>,
    fragmenter: Arc<dyn Fragmenter>,
    local_storage_path: PathBuf,
    video: Option<Video>,
    downloaded: Option<PathBuf>,
}

impl VideoService {
    pub fn new(
        video_repository: VideoRepository,
        storage: Arc<dyn ObjectStorage>,
        fragmenter: Arc<dyn Fragmenter>,
        local_storage_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            video_repository,
            storage,
            fragmenter,
            local_storage_path: local_storage_path.into(),
            video: None,
            downloaded: None,
        }
    }

    /// Binds `video` for the next download. The id becomes part of local file
    /// names and must be a UUID.
    pub fn bind(&mut self, video: Video) -> Result<()> {
        if !is_video_id(&video.id) {
            return Err(EncoderError::InvalidVideoId(video.id));
        }

        self.downloaded = None;
        self.video = Some(video);
        Ok(())
    }

    /// Looks the video up by id and binds it.
    pub async fn load(&mut self, id: &str) -> Result<&Video> {
        let video = self.video_repository.find(id).await?;
        self.bind(video)?;
        self.video
            .as_ref()
            .ok_or_else(|| EncoderError::not_found("video", id))
    }

    pub fn video(&self) -> Option<&Video> {
        self.video.as_ref()
    }

    fn source_path(&self, video: &Video) -> PathBuf {
        self.local_storage_path.join(format!("{}.mp4", video.id))
    }

    fn fragment_path(&self, video: &Video) -> PathBuf {
        self.local_storage_path.join(format!("{}.frag", video.id))
    }

    fn work_dir(&self, video: &Video) -> PathBuf {
        self.local_storage_path.join(&video.id)
    }

    /// Fetches the bound video's file from `bucket` into local storage.
    pub async fn download(&mut self, bucket: &str) -> Result<PathBuf> {
        let video = self
            .video
            .as_ref()
            .ok_or_else(|| EncoderError::Download("no video bound to the service".to_string()))?;

        info!(
            "⬇️ Downloading {} (resource {}) from bucket {}",
            video.file_path, video.resource_id, bucket
        );

        let data = self
            .storage
            .get_object(bucket, &video.file_path)
            .await
            .map_err(|e| EncoderError::Download(e.to_string()))?;

        let path = self.source_path(video);
        tokio::fs::create_dir_all(&self.local_storage_path)
            .await
            .map_err(|e| EncoderError::Download(format!("{:?}: {}", self.local_storage_path, e)))?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| EncoderError::Download(format!("{:?}: {}", path, e)))?;

        info!("Video {} has been stored at {:?} ({} bytes)", video.id, path, data.len());

        self.downloaded = Some(path.clone());
        Ok(path)
    }

    /// Splits the downloaded file into `{root}/{video_id}.frag`, creating the
    /// video-scoped working directory alongside it.
    pub async fn fragment(&self) -> Result<PathBuf> {
        let video = self
            .video
            .as_ref()
            .ok_or_else(|| EncoderError::Fragmentation("no video bound to the service".to_string()))?;
        let source = self.downloaded.as_ref().ok_or_else(|| {
            EncoderError::Fragmentation(format!("video {} has not been downloaded", video.id))
        })?;

        let work_dir = self.work_dir(video);
        tokio::fs::create_dir_all(&work_dir)
            .await
            .map_err(|e| EncoderError::Fragmentation(format!("{:?}: {}", work_dir, e)))?;

        let destination = self.fragment_path(video);
        self.fragmenter
            .fragment(source, &destination)
            .await
            .map_err(|e| EncoderError::Fragmentation(e.to_string()))?;

        info!("Video {} fragmented into {:?}", video.id, destination);
        Ok(destination)
    }

    /// Removes every local artifact of the bound video.
    pub async fn finish(&mut self) -> Result<()> {
        let Some(video) = self.video.as_ref() else {
            return Ok(());
        };

        remove(&self.source_path(video), false).await?;
        remove(&self.fragment_path(video), false).await?;
        remove(&self.work_dir(video), true).await?;
        self.downloaded = None;

        info!("Cleaned up files for video {}", video.id);
        Ok(())
    }
}

async fn remove(path: &Path, dir: bool) -> Result<()> {
    let result = if dir {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Err(e) if e.kind() != ErrorKind::NotFound => {
            Err(EncoderError::Cleanup(format!("{:?}: {}", path, e)))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::pool::Database;
    use crate::infrastructure::media::MockFragmenter;
    use crate::infrastructure::storage::MockObjectStorage;
    use anyhow::anyhow;
    use bytes::Bytes;
    use tempfile::TempDir;

    const FILE_PATH: &str = "videos/3fa3291e/source.mp4";

    struct Fixture {
        dir: TempDir,
        repo: VideoRepository,
        video: Video,
    }

    async fn fixture() -> Fixture {
        let repo = VideoRepository::new(Database::in_memory().await.unwrap());
        let video = Video::new("3fa3291e", FILE_PATH);
        repo.insert(&video).await.unwrap();

        Fixture {
            dir: tempfile::tempdir().unwrap(),
            repo,
            video,
        }
    }

    fn storage_returning(body: &'static [u8]) -> MockObjectStorage {
        let mut storage = MockObjectStorage::new();
        storage
            .expect_get_object()
            .withf(|bucket, key| bucket.to_string() == "encoder-input" && key.to_string() == FILE_PATH)
            .times(1)
            .returning(move |_, _| Ok(Bytes::from_static(body)));
        storage
    }

    fn service(fx: &Fixture, storage: MockObjectStorage, fragmenter: MockFragmenter) -> VideoService {
        VideoService::new(
            fx.repo.clone(),
            Arc::new(storage),
            Arc::new(fragmenter),
            fx.dir.path(),
        )
    }

    #[tokio::test]
    async fn download_then_fragment() {
        let fx = fixture().await;
        let source = fx.dir.path().join(format!("{}.mp4", fx.video.id));
        let destination = fx.dir.path().join(format!("{}.frag", fx.video.id));

        let mut fragmenter = MockFragmenter::new();
        let (expected_src, expected_dst) = (source.clone(), destination.clone());
        fragmenter
            .expect_fragment()
            .withf(move |src, dst| src.to_path_buf() == expected_src && dst.to_path_buf() == expected_dst)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut service = service(&fx, storage_returning(b"mp4 bytes"), fragmenter);
        service.load(&fx.video.id).await.unwrap();

        let downloaded = service.download("encoder-input").await.unwrap();
        assert_eq!(downloaded, source);
        assert_eq!(std::fs::read(&source).unwrap(), b"mp4 bytes");

        let fragmented = service.fragment().await.unwrap();
        assert_eq!(fragmented, destination);
        assert!(fx.dir.path().join(&fx.video.id).is_dir());
    }

    #[tokio::test]
    async fn fragment_requires_a_download() {
        let fx = fixture().await;
        let mut fragmenter = MockFragmenter::new();
        fragmenter.expect_fragment().never();

        let mut service = service(&fx, MockObjectStorage::new(), fragmenter);
        service.bind(fx.video.clone()).unwrap();

        let err = service.fragment().await.unwrap_err();
        assert!(matches!(err, EncoderError::Fragmentation(_)));
    }

    #[tokio::test]
    async fn download_requires_a_bound_video() {
        let fx = fixture().await;
        let mut storage = MockObjectStorage::new();
        storage.expect_get_object().never();

        let mut service = service(&fx, storage, MockFragmenter::new());

        let err = service.download("encoder-input").await.unwrap_err();
        assert!(matches!(err, EncoderError::Download(_)));
    }

    #[tokio::test]
    async fn storage_failure_is_a_download_error() {
        let fx = fixture().await;
        let mut storage = MockObjectStorage::new();
        storage
            .expect_get_object()
            .returning(|_, _| Err(anyhow!("NoSuchKey")));

        let mut service = service(&fx, storage, MockFragmenter::new());
        service.bind(fx.video.clone()).unwrap();

        match service.download("encoder-input").await {
            Err(EncoderError::Download(msg)) => assert!(msg.contains("NoSuchKey")),
            other => panic!("expected download error, got {:?}", other),
        }
        assert!(matches!(
            service.fragment().await,
            Err(EncoderError::Fragmentation(_))
        ));
    }

    #[tokio::test]
    async fn tool_failure_is_a_fragmentation_error() {
        let fx = fixture().await;
        let mut fragmenter = MockFragmenter::new();
        fragmenter
            .expect_fragment()
            .returning(|_, _| Err(anyhow!("mp4fragment exited with 1")));

        let mut service = service(&fx, storage_returning(b"broken"), fragmenter);
        service.bind(fx.video.clone()).unwrap();
        service.download("encoder-input").await.unwrap();

        let err = service.fragment().await.unwrap_err();
        assert!(matches!(err, EncoderError::Fragmentation(msg) if msg.contains("exited with 1")));
    }

    #[tokio::test]
    async fn finish_removes_local_artifacts() {
        let fx = fixture().await;
        let mut fragmenter = MockFragmenter::new();
        fragmenter.expect_fragment().returning(|_, dst| {
            std::fs::write(dst, b"fragmented")?;
            Ok(())
        });

        let mut service = service(&fx, storage_returning(b"mp4 bytes"), fragmenter);
        service.bind(fx.video.clone()).unwrap();
        let source = service.download("encoder-input").await.unwrap();
        let fragment = service.fragment().await.unwrap();
        assert!(fragment.exists());

        service.finish().await.unwrap();
        assert!(!source.exists());
        assert!(!fragment.exists());
        assert!(!fx.dir.path().join(&fx.video.id).exists());

        // Nothing left to remove is not an error.
        service.finish().await.unwrap();
    }

    #[tokio::test]
    async fn path_like_ids_are_never_bound() {
        let fx = fixture().await;
        let outside = fx.dir.path().join("keep.txt");
        std::fs::write(&outside, b"unrelated").unwrap();

        let mut storage = MockObjectStorage::new();
        storage.expect_get_object().never();
        let mut service = service(&fx, storage, MockFragmenter::new());

        for id in ["..", "../x", "a/b"] {
            let err = service
                .bind(Video::with_id(id, "video", FILE_PATH))
                .unwrap_err();
            assert!(matches!(err, EncoderError::InvalidVideoId(ref bad) if bad == id));
        }
        assert!(service.video().is_none());

        assert!(matches!(
            service.download("encoder-input").await,
            Err(EncoderError::Download(_))
        ));
        service.finish().await.unwrap();
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn load_unknown_video_is_not_found() {
        let fx = fixture().await;
        let mut service = service(&fx, MockObjectStorage::new(), MockFragmenter::new());

        assert!(matches!(
            service.load("missing").await,
            Err(EncoderError::NotFound { .. })
        ));
        assert!(service.video().is_none());
    }
}
