use async_trait::async_trait;
use batch_finisher::{Args, FinisherError, Layout, run};
use common::{LocalFsBackend, ObjectBackend, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Records every upload instead of talking to S3.
#[derive(Default)]
struct RecordingBackend {
    puts: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl ObjectBackend for RecordingBackend {
    fn bucket(&self) -> &str {
        "recording"
    }

    async fn put_object(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), data.to_vec()));
        Ok(())
    }

    async fn download_to(&self, key: &str, _dest: &Path) -> Result<u64, StoreError> {
        Err(StoreError::NotFound {
            bucket: "recording".to_string(),
            key: key.to_string(),
        })
    }
}

fn make_args(index: u64, size: u64, job_id: &str, payload: &str) -> Args {
    Args {
        payload: payload.to_string(),
        test_env: "dev".to_string(),
        array_index: index,
        array_size: size,
        job_id: job_id.to_string(),
    }
}

/// `<tmp>/mnt` with `efs/lambda/test.txt` holding `content`.
fn make_mount(content: Option<&str>) -> (TempDir, Layout) {
    let dir = tempfile::tempdir().unwrap();
    let mount = dir.path().join("mnt");
    let lambda = mount.join("efs").join("lambda");
    fs::create_dir_all(&lambda).unwrap();
    let result_file = lambda.join("test.txt");
    if let Some(content) = content {
        fs::write(&result_file, content).unwrap();
    }
    let layout = Layout {
        mount_root: mount,
        result_file,
        output_key: "output/output.txt".to_string(),
    };
    (dir, layout)
}

#[tokio::test]
async fn test_last_element_uploads_result() {
    let (dir, layout) = make_mount(Some("rendered frames"));
    let store = LocalFsBackend::new(dir.path().join("s3"), "brender-cdk-ecr-batch-s3-bucket");
    let mut out = Vec::new();

    let report = run(&make_args(2, 3, "abc:2", r#"{"a":1}"#), &layout, &store, &mut out)
        .await
        .unwrap();

    assert_eq!(report.uploaded_key.as_deref(), Some("output/output.txt"));
    assert_eq!(report.payload, Some(serde_json::json!({"a": 1})));
    let uploaded = fs::read_to_string(store.path_for("output/output.txt")).unwrap();
    assert_eq!(uploaded, "rendered frames");

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Job Id Without Index: abc\n"));
    assert!(printed.contains("Parsed JSON:\n{\n  \"a\": 1\n}\n"));
    assert!(printed.contains(&format!("Tree of {}:", layout.mount_root.display())));
    assert!(printed.contains("Executing last element of the array\nrendered frames\n"));
}

#[tokio::test]
async fn test_other_element_does_not_upload() {
    let (_dir, layout) = make_mount(Some("rendered frames"));
    let store = RecordingBackend::default();
    let mut out = Vec::new();

    let report = run(&make_args(0, 3, "abc:0", r#"{"a":1}"#), &layout, &store, &mut out)
        .await
        .unwrap();

    assert!(report.uploaded_key.is_none());
    assert!(store.puts.lock().unwrap().is_empty());
    let expected: Vec<PathBuf> = vec![
        layout.mount_root.join("efs"),
        layout.mount_root.join("efs").join("lambda"),
        layout.result_file.clone(),
    ];
    let listed: Vec<PathBuf> = report.tree.iter().map(|e| e.path.clone()).collect();
    assert_eq!(listed, expected);
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("Executing other elements of the array"));
}

#[tokio::test]
async fn test_upload_happens_only_for_last_index() {
    let (_dir, layout) = make_mount(Some("x"));
    for size in 1..5u64 {
        for index in 0..5u64 {
            let store = RecordingBackend::default();
            let mut out = Vec::new();
            run(&make_args(index, size, "job", "{}"), &layout, &store, &mut out)
                .await
                .unwrap();
            let puts = store.puts.lock().unwrap();
            assert_eq!(puts.len(), usize::from(index + 1 == size), "index={index} size={size}");
        }
    }
}

#[tokio::test]
async fn test_malformed_payload_still_lists_mount() {
    let (_dir, layout) = make_mount(Some("x"));
    let store = RecordingBackend::default();
    let mut out = Vec::new();

    let report = run(&make_args(0, 2, "job:0", "{oops"), &layout, &store, &mut out)
        .await
        .unwrap();

    assert!(report.payload.is_none());
    assert_eq!(report.tree.len(), 3);
    let printed = String::from_utf8(out).unwrap();
    let err_at = printed.find("Error parsing JSON:").unwrap();
    let tree_at = printed.find("Tree of ").unwrap();
    assert!(err_at < tree_at);
}

#[tokio::test]
async fn test_missing_result_file_fails_without_upload() {
    let (_dir, layout) = make_mount(None);
    let store = RecordingBackend::default();
    let mut out = Vec::new();

    let err = run(&make_args(1, 2, "job:1", "{}"), &layout, &store, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, FinisherError::ReadResult { .. }));
    assert!(store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_mount_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout {
        mount_root: dir.path().join("absent"),
        result_file: dir.path().join("absent").join("test.txt"),
        output_key: "output/output.txt".to_string(),
    };
    let store = RecordingBackend::default();
    let mut out = Vec::new();

    let err = run(&make_args(0, 1, "job", "{}"), &layout, &store, &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, FinisherError::ListMount { .. }));
}
