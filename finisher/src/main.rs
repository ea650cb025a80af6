use anyhow::Context;
use batch_finisher::{Args, Layout, OUTPUT_BUCKET, run};
use clap::Parser;
use common::S3Backend;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    common::logging::init();
    let args = Args::parse();

    let layout = Layout::default();
    let store = S3Backend::new(OUTPUT_BUCKET).await;
    let mut stdout = std::io::stdout().lock();

    let report = run(&args, &layout, &store, &mut stdout)
        .await
        .context("array job finisher failed")?;
    tracing::debug!(
        entries = report.tree.len(),
        uploaded = report.uploaded_key.is_some(),
        "finisher done"
    );
    Ok(())
}
