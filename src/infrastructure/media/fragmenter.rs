use anyhow::anyhow;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use super::Fragmenter;

/// Bento4 `mp4fragment` wrapper.
#[derive(Debug, Clone)]
pub struct Mp4Fragmenter {
    binary: PathBuf,
}

impl Default for Mp4Fragmenter {
    fn default() -> Self {
        Self::new("mp4fragment")
    }
}

impl Mp4Fragmenter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl Fragmenter for Mp4Fragmenter {
    async fn fragment(&self, source: &Path, destination: &Path) -> anyhow::Result<()> {
        info!("Fragmenting {:?} into {:?}", source, destination);

        // Dropping the future (job cancelled) kills the child.
        let output = Command::new(&self.binary)
            .kill_on_drop(true)
            .arg(source)
            .arg(destination)
            .output()
            .await
            .map_err(|e| anyhow!("Failed to run {:?}: {}", self.binary, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            debug!("=====> Output: {}", stdout);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{:?} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fragmenter = Mp4Fragmenter::new(dir.path().join("no-such-mp4fragment"));

        let result = fragmenter
            .fragment(&dir.path().join("in.mp4"), &dir.path().join("out.frag"))
            .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("Failed to run"), "{}", message);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "echo 'invalid input file' >&2\nexit 3\n").unwrap();

        let err = Mp4Fragmenter::new("/bin/sh")
            .fragment(&script, &dir.path().join("out.frag"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid input file"), "{}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dropped_fragment_kills_the_tool() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.sh");
        let marker = dir.path().join("finished");
        std::fs::write(&script, "sleep 1\ntouch \"$1\"\n").unwrap();

        let fragmenter = Mp4Fragmenter::new("/bin/sh");
        let run = fragmenter.fragment(&script, &marker);
        assert!(
            tokio::time::timeout(Duration::from_millis(100), run)
                .await
                .is_err()
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }
}
