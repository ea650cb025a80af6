use std::path::{Path, PathBuf};

/// Folder under the mount that receives downloaded objects.
pub const LAMBDA_FOLDER: &str = "lambda";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub bucket: String,
    pub object_key: String,
    pub mount_path: PathBuf,
}

impl Transfer {
    pub fn new(
        bucket: impl Into<String>,
        object_key: impl Into<String>,
        mount_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object_key: object_key.into(),
            mount_path: mount_path.into(),
        }
    }

    /// Last segment of the object key. Empty when the key ends with `/`.
    pub fn file_name(&self) -> &str {
        object_basename(&self.object_key)
    }

    /// `<mount>/lambda/<basename of key>`
    pub fn destination(&self) -> PathBuf {
        destination_for(&self.mount_path, &self.object_key)
    }
}

pub fn object_basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

pub fn destination_for(mount: &Path, key: &str) -> PathBuf {
    mount.join(LAMBDA_FOLDER).join(object_basename(key))
}
