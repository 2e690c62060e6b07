//! S3 backend: client configuration and hierarchical listing.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::Client;
use bytes::Bytes;
use kbx_error::{KbxError, Result, StorageError};
use kbx_traits::{ContentFetcher, ListEntry, StorageLister};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default operation timeout for S3 calls.
pub const DEFAULT_S3_TIMEOUT_SECS: u64 = 30;

/// Static access key pair. The secret is kept out of `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct StaticCredentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Where the backup bucket lives and how to reach it.
///
/// Unset fields fall back to the AWS default provider chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: Option<String>,

    /// Custom endpoint such as LocalStack or MinIO; switches to path-style addressing
    pub endpoint: Option<String>,

    pub credentials: Option<StaticCredentials>,
    pub profile: Option<String>,

    /// Per-operation timeout covering retries inside the SDK
    pub timeout_secs: u64,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: None,
            endpoint: None,
            credentials: None,
            profile: None,
            timeout_secs: DEFAULT_S3_TIMEOUT_SECS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.credentials = Some(StaticCredentials {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        });
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Custom endpoints are addressed path-style.
    pub fn path_style(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Reject settings that cannot reach a bucket.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(KbxError::Config("S3 bucket name must not be blank".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(KbxError::Config("S3 timeout must be at least 1 second".to_string()));
        }
        if self.endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(KbxError::Config("S3 endpoint must not be blank".to_string()));
        }
        if let Some(creds) = &self.credentials {
            if creds.access_key.trim().is_empty() || creds.secret_key.trim().is_empty() {
                return Err(KbxError::Config(
                    "S3 access key and secret key must both be set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Build an S3 client for `config`, validating it first.
pub async fn create_s3_client(config: &S3Config) -> Result<Client> {
    config.validate()?;

    let timeouts = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(config.timeout_secs))
        .build();
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    if let Some(creds) = &config.credentials {
        loader = loader.credentials_provider(Credentials::new(
            &creds.access_key,
            &creds.secret_key,
            None,
            None,
            "kbx-static",
        ));
    }
    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.path_style())
        .build();

    debug!(
        bucket = %config.bucket,
        endpoint = config.endpoint.as_deref(),
        path_style = config.path_style(),
        "S3 client created"
    );

    Ok(Client::from_conf(s3_config))
}

/// Backup store over one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build the client and the store from configuration.
    pub async fn from_config(config: &S3Config) -> Result<Self> {
        let client = create_s3_client(config).await?;
        Ok(Self::new(client, config.bucket.clone()))
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl StorageLister for S3Storage {
    async fn list_children(&self, prefix: &str) -> Result<Vec<ListEntry>> {
        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter("/");

            if let Some(ref token) = continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req.send().await.map_err(|e| {
                classify(&e, |message| StorageError::List {
                    prefix: prefix.to_string(),
                    message,
                })
            })?;

            if let Some(common_prefixes) = resp.common_prefixes {
                entries.extend(
                    common_prefixes
                        .into_iter()
                        .filter_map(|cp| cp.prefix)
                        .map(ListEntry::partition),
                );
            }

            if let Some(contents) = resp.contents {
                entries.extend(
                    contents
                        .into_iter()
                        .filter_map(|obj| obj.key)
                        // Skip the directory marker of the listed prefix
                        .filter(|key| !key.is_empty() && key != prefix)
                        .map(ListEntry::leaf),
                );
            }

            if resp.is_truncated == Some(true) {
                continuation_token = resp.next_continuation_token;
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(
            bucket = %self.bucket,
            prefix,
            entry_count = entries.len(),
            "Listed prefix"
        );

        Ok(entries)
    }
}

#[async_trait]
impl ContentFetcher for S3Storage {
    async fn fetch_content(&self, key: &str) -> Result<Bytes> {
        let fetch_error = |message: String| StorageError::Fetch {
            key: key.to_string(),
            message,
        };

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(&e, fetch_error))?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        Ok(body.into_bytes())
    }
}

/// Unreachable or timed-out endpoints are connection failures; anything the
/// service answered falls back to the operation's own error.
fn classify<E, R>(err: &SdkError<E, R>, fallback: impl FnOnce(String) -> StorageError) -> StorageError
where
    E: std::error::Error + 'static,
    R: fmt::Debug,
{
    let message = DisplayErrorContext(err).to_string();
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StorageError::Connection(message),
        _ => fallback(message),
    }
}
