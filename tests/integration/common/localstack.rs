//! LocalStack test context and utilities.

use std::io::Write;

use aws_sdk_s3::Client as S3Client;
use flate2::write::GzEncoder;
use flate2::Compression;
use kbx_explorer::storage::{S3Config, S3Storage};

/// LocalStack test context providing an S3 client.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Create a new LocalStack test context.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                "test", "test", None, None, "localstack",
            ))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Self {
            s3: S3Client::from_conf(s3_config),
            endpoint,
            region,
        }
    }

    /// Check if LocalStack is available and healthy.
    pub async fn is_available(&self) -> bool {
        // Try to list S3 buckets - this will fail quickly if LocalStack isn't running
        self.s3.list_buckets().send().await.is_ok()
    }

    /// Create an S3 bucket for testing.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if !exists {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Upload a gzip-compressed data file.
    pub async fn upload_gzip(
        &self,
        bucket: &str,
        key: &str,
        text: &str,
    ) -> Result<(), aws_sdk_s3::Error> {
        self.upload_raw(bucket, key, gzip(text)).await
    }

    /// Upload raw bytes.
    pub async fn upload_raw(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
    ) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.into())
            .content_type("application/gzip")
            .send()
            .await?;
        Ok(())
    }

    /// An explorer store reading `bucket` through LocalStack.
    pub async fn storage(&self, bucket: &str) -> S3Storage {
        let config = S3Config::new(bucket)
            .with_endpoint(&self.endpoint)
            .with_region(&self.region)
            .with_credentials("test", "test");

        S3Storage::from_config(&config)
            .await
            .expect("Failed to create S3 storage")
    }
}

/// Gzip `text` the way Kafka sink connectors write data files.
pub fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .expect("Failed to compress test data");
    encoder.finish().expect("Failed to finish gzip stream")
}
