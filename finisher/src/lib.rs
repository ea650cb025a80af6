//! Array job finisher.
//!
//! Every child of the array prints its job metadata, the JSON payload it was
//! started with and the contents of the shared mount. The last child
//! additionally reads the result file from the mount and uploads it to the
//! output bucket. Nothing checks that the sibling producing the result file
//! has finished; ordering between children is assumed.

pub mod args;
pub mod job;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use common::{ObjectBackend, StoreError, TreeEntry};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

pub use args::Args;
pub use job::ArrayJob;

pub const MOUNT_ROOT: &str = "/mnt";
pub const RESULT_FILE: &str = "/mnt/efs/lambda/test.txt";
pub const OUTPUT_BUCKET: &str = "brender-cdk-ecr-batch-s3-bucket";
pub const OUTPUT_PREFIX: &str = "output/";
pub const OUTPUT_FILE_NAME: &str = "output.txt";

#[derive(Error, Debug)]
pub enum FinisherError {
    #[error("failed to list mount root {path:?}: {source}")]
    ListMount {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read result file {path:?}: {source}")]
    ReadResult {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to upload result: {0}")]
    Upload(#[from] StoreError),

    #[error("failed to write job output: {0}")]
    Output(#[from] io::Error),
}

/// Where the finisher looks and what it writes.
#[derive(Debug, Clone)]
pub struct Layout {
    pub mount_root: PathBuf,
    pub result_file: PathBuf,
    pub output_key: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            mount_root: PathBuf::from(MOUNT_ROOT),
            result_file: PathBuf::from(RESULT_FILE),
            output_key: format!("{OUTPUT_PREFIX}{OUTPUT_FILE_NAME}"),
        }
    }
}

#[derive(Debug)]
pub struct FinisherReport {
    /// `None` when the payload was not valid JSON.
    pub payload: Option<Value>,
    /// Key written to the output bucket, set only on the last element.
    pub uploaded_key: Option<String>,
    pub tree: Vec<TreeEntry>,
}

/// Parse the command line payload. A failure is reported on `out` and is
/// not fatal.
pub fn parse_payload<W: Write>(raw: &str, out: &mut W) -> io::Result<Option<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
            writeln!(out, "Parsed JSON:")?;
            writeln!(out, "{pretty}")?;
            Ok(Some(value))
        }
        Err(e) => {
            warn!("payload is not valid JSON: {e}");
            writeln!(out, "Error parsing JSON: {e}")?;
            Ok(None)
        }
    }
}

pub async fn run<B, W>(
    args: &Args,
    layout: &Layout,
    store: &B,
    out: &mut W,
) -> Result<FinisherReport, FinisherError>
where
    B: ObjectBackend + ?Sized,
    W: Write,
{
    let job = args.array_job();
    writeln!(out, "Test Env: {}", args.test_env)?;
    writeln!(out, "Matrix Index: {}", job.index)?;
    writeln!(out, "Array Size Job: {}", job.size)?;
    writeln!(out, "Job ID: {}", job.job_id)?;
    writeln!(out, "Job Id Without Index: {}", job.job_id_without_index())?;

    let payload = parse_payload(&args.payload, out)?;

    let root = &layout.mount_root;
    let names = common::list_dir(root).map_err(|source| FinisherError::ListMount {
        path: root.clone(),
        source,
    })?;
    writeln!(out, "Content of {}:", root.display())?;
    writeln!(out, "{names:?}")?;

    let tree = common::walk_tree(root);
    writeln!(out, "Tree of {}:", root.display())?;
    for entry in &tree {
        writeln!(out, "{}", entry.path.display())?;
    }

    let mut uploaded_key = None;
    if job.is_last() {
        info!(index = job.index, size = job.size, "last array element, publishing result");
        writeln!(out, "Executing last element of the array")?;

        let content = tokio::fs::read_to_string(&layout.result_file)
            .await
            .map_err(|source| FinisherError::ReadResult {
                path: layout.result_file.clone(),
                source,
            })?;
        writeln!(out, "{content}")?;

        store
            .put_object(&layout.output_key, content.as_bytes())
            .await?;
        uploaded_key = Some(layout.output_key.clone());
    } else {
        info!(index = job.index, size = job.size, "not the last array element, skipping upload");
        writeln!(out, "Executing other elements of the array")?;
    }

    Ok(FinisherReport {
        payload,
        uploaded_key,
        tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_payload_round_trips() {
        let mut out = Vec::new();
        let raw = r#"{"frames":[1,2,3],"scene":{"name":"shot","gpu":true},"a":null}"#;
        let value = parse_payload(raw, &mut out).unwrap().unwrap();
        assert_eq!(
            value,
            json!({"frames": [1, 2, 3], "scene": {"name": "shot", "gpu": true}, "a": null})
        );

        let printed = String::from_utf8(out).unwrap();
        let body = printed.strip_prefix("Parsed JSON:\n").unwrap();
        let reparsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn test_parse_payload_keeps_key_order() {
        let mut out = Vec::new();
        parse_payload(r#"{"b":1,"a":2}"#, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.find("\"b\"").unwrap() < printed.find("\"a\"").unwrap());
    }

    #[test]
    fn test_parse_payload_malformed_is_reported() {
        let mut out = Vec::new();
        let value = parse_payload("{not json", &mut out).unwrap();
        assert!(value.is_none());
        assert!(String::from_utf8(out).unwrap().starts_with("Error parsing JSON: "));
    }

    #[test]
    fn test_default_layout() {
        let layout = Layout::default();
        assert_eq!(layout.mount_root, PathBuf::from("/mnt"));
        assert_eq!(layout.result_file, PathBuf::from("/mnt/efs/lambda/test.txt"));
        assert_eq!(layout.output_key, "output/output.txt");
    }
}
