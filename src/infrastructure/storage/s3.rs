use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use bytes::Bytes;
use tracing::info;

use super::ObjectStorage;
use crate::config::settings::S3Config;

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
}

impl StorageService {
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "static",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            // MinIO and other S3-compatible stores need path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        info!("✅ S3 client ready (region {})", config.region);

        Self { client }
    }
}

#[async_trait]
impl ObjectStorage for StorageService {
    async fn get_object(&self, bucket: &str, key: &str) -> anyhow::Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch s3://{}/{}: {}", bucket, key, e))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| anyhow!("Failed to read s3://{}/{}: {}", bucket, key, e))?
            .into_bytes();

        Ok(data)
    }
}
