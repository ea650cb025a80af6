use anyhow::Context;
use clap::Parser;
use common::S3Backend;
use efs_fetcher::{Args, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    common::logging::init();
    let args = Args::parse();

    let transfer = args.transfer();
    let store = S3Backend::new(transfer.bucket.clone()).await;
    let mut stdout = std::io::stdout().lock();

    let report = run(&transfer, &store, &mut stdout).await.with_context(|| {
        format!(
            "failed to fetch s3://{}/{}",
            transfer.bucket, transfer.object_key
        )
    })?;
    tracing::debug!(bytes = report.bytes, entries = report.tree.len(), "fetch done");
    Ok(())
}
