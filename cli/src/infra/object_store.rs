//! S3 implementation of the `ObjectStore` port.

use std::path::Path;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{Credentials, Region};

use crate::application::ports::ObjectStore;
use crate::domain::config::StorageConfig;

/// Provider name attached to the static credentials.
const CREDENTIALS_PROVIDER: &str = "loader-bootstrap-static";

/// Object store backed by `aws-sdk-s3` with static credentials.
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint.
    ///
    /// No request is made here; the first network round trip is
    /// [`ObjectStore::resolve_bucket`].
    #[must_use]
    pub fn connect(cfg: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            cfg.access_key.clone(),
            cfg.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint_url(&cfg.endpoint))
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(cfg.path_style)
            .behavior_version(BehaviorVersion::latest())
            .build();
        tracing::debug!(endpoint = %cfg.endpoint, region = %cfg.region, path_style = cfg.path_style, "s3 client configured");
        Self {
            client: S3Client::from_conf(s3_config),
        }
    }
}

/// Endpoints are configured as bare host names; default to HTTPS.
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

impl ObjectStore for S3ObjectStore {
    async fn resolve_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .with_context(|| format!("head bucket {bucket}"))?;
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("get object s3://{bucket}/{key}"))?;
        let data = object
            .body
            .collect()
            .await
            .with_context(|| format!("reading body of s3://{bucket}/{key}"))?
            .into_bytes();
        tokio::fs::write(dest, &data)
            .await
            .with_context(|| format!("writing {}", dest.display()))?;
        Ok(data.len() as u64)
    }
}
