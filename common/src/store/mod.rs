//! Object store adapter
//!
//! Submodules:
//! - `s3`: adapter backed by `aws-sdk-s3`
//! - `localfs`: directory-backed mock used by tests and local runs
//!
//! A backend is bound to a single bucket. Every call is a single attempt;
//! failures surface to the caller untouched.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod localfs;
pub mod s3;

pub use localfs::LocalFsBackend;
pub use s3::S3Backend;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("{op} s3://{bucket}/{key} failed: {message}")]
    Request {
        op: &'static str,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("local path {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Bucket this backend reads from and writes to.
    fn bucket(&self) -> &str;

    /// Store `data` under `key`, replacing any existing object.
    async fn put_object(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Copy the object at `key` into the local file `dest`, returning the number
    /// of bytes written. The parent directory of `dest` must already exist.
    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64, StoreError>;
}

/// Sibling path the download is staged in before being renamed onto `dest`.
pub(crate) fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".download");
    dest.with_file_name(name)
}
