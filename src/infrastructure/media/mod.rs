use async_trait::async_trait;
use std::path::Path;

pub mod fragmenter;

pub use fragmenter::Mp4Fragmenter;

/// Splits a downloaded MP4 into a fragmented file ready for encoding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fragmenter: Send + Sync {
    async fn fragment(&self, source: &Path, destination: &Path) -> anyhow::Result<()>;
}
