//! Object fetcher: copies one object from S3 into `<mount>/lambda/` and
//! prints what the mount holds afterwards.

pub mod args;
pub mod transfer;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use common::{ObjectBackend, StoreError, TreeEntry};
use thiserror::Error;
use tracing::info;

pub use args::Args;
pub use transfer::{LAMBDA_FOLDER, Transfer};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to download object: {0}")]
    Download(#[from] StoreError),

    #[error("failed to list mount {path:?}: {source}")]
    ListMount {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write job output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug)]
pub struct FetchReport {
    pub destination: PathBuf,
    pub bytes: u64,
    pub tree: Vec<TreeEntry>,
}

/// Download `transfer` through `store`, which must be bound to
/// `transfer.bucket`, then list the mount.
pub async fn run<B, W>(
    transfer: &Transfer,
    store: &B,
    out: &mut W,
) -> Result<FetchReport, FetchError>
where
    B: ObjectBackend + ?Sized,
    W: Write,
{
    let mount = &transfer.mount_path;
    writeln!(out, "EFS mount path: {}", mount.display())?;

    let destination = transfer.destination();
    info!(
        bucket = %transfer.bucket,
        key = %transfer.object_key,
        dest = %destination.display(),
        "downloading object"
    );
    let bytes = store
        .download_to(&transfer.object_key, &destination)
        .await?;
    writeln!(out, "Downloaded object to {}", destination.display())?;

    let names = common::list_dir(mount).map_err(|source| FetchError::ListMount {
        path: mount.clone(),
        source,
    })?;
    writeln!(out, "Content of {}:", mount.display())?;
    for name in &names {
        writeln!(out, "{name}")?;
    }

    let tree = common::walk_tree(mount);
    writeln!(out, "Tree of {}:", mount.display())?;
    for entry in &tree {
        writeln!(out, "{}", entry.path.display())?;
    }

    Ok(FetchReport {
        destination,
        bytes,
        tree,
    })
}
