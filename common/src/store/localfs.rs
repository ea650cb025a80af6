//! Local directory backend, a mock of the object store (implements ObjectBackend).
//!
//! Objects live at `<root>/<bucket>/<key>`.

use super::{ObjectBackend, StoreError, staging_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

pub struct LocalFsBackend {
    root: PathBuf,
    bucket: String,
}

impl LocalFsBackend {
    pub fn new<P: AsRef<Path>>(root: P, bucket: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            bucket: bucket.into(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(&self.bucket).join(key)
    }
}

#[async_trait]
impl ObjectBackend for LocalFsBackend {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }
        let mut f = fs::File::create(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        f.write_all(data).await.map_err(|e| StoreError::io(&path, e))?;
        f.flush().await.map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64, StoreError> {
        let src = self.path_for(key);
        let data = match fs::read(&src).await {
            Ok(buf) => buf,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(StoreError::io(&src, e)),
        };

        let staging = staging_path(dest);
        if let Err(e) = fs::write(&staging, &data).await {
            return Err(StoreError::io(&staging, e));
        }
        if let Err(e) = fs::rename(&staging, dest).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StoreError::io(dest, e));
        }
        Ok(data.len() as u64)
    }
}
