use async_trait::async_trait;
use bytes::Bytes;

pub mod s3;

pub use s3::StorageService;

/// Read access to the remote object store holding source videos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> anyhow::Result<Bytes>;
}
