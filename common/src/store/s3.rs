//! S3 adapter: single-attempt put/get on top of aws-sdk-s3.

use super::{ObjectBackend, StoreError, staging_path};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Build a client from the default provider chain (environment, then the
    /// container role of the batch job).
    pub async fn new(bucket: impl Into<String>) -> Self {
        let conf = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_client(Client::new(&conf), bucket)
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn request_error(&self, op: &'static str, key: &str, message: String) -> StoreError {
        StoreError::Request {
            op,
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message,
        }
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key, len = data.len(), "put_object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| self.request_error("put_object", key, DisplayErrorContext(&e).to_string()))?;
        info!(bucket = %self.bucket, key, "object uploaded");
        Ok(())
    }

    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64, StoreError> {
        debug!(bucket = %self.bucket, key, dest = %dest.display(), "get_object");
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(o) => o,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Err(StoreError::NotFound {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                    });
                }
                return Err(self.request_error("get_object", key, DisplayErrorContext(&e).to_string()));
            }
        };

        // stream into a sibling file, then rename so `dest` is never truncated
        let staging = staging_path(dest);
        let written = async {
            let mut file = fs::File::create(&staging).await?;
            let mut body = resp.body.into_async_read();
            let n = tokio::io::copy(&mut body, &mut file).await?;
            file.flush().await?;
            Ok::<_, std::io::Error>(n)
        }
        .await;

        let n = match written {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                return Err(StoreError::io(&staging, e));
            }
        };
        if let Err(e) = fs::rename(&staging, dest).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StoreError::io(dest, e));
        }
        info!(bucket = %self.bucket, key, bytes = n, "object downloaded");
        Ok(n)
    }
}

