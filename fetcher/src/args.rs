use crate::transfer::Transfer;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "efs-fetcher",
    about = "Copy one S3 object into the lambda folder of the EFS mount"
)]
pub struct Args {
    /// Root of the EFS mount
    #[arg(long, env = "EFS_MOUNT_PATH", hide = true)]
    pub efs_mount_path: PathBuf,

    /// Bucket holding the object
    #[arg(long, env = "S3_BUCKET_NAME", hide = true)]
    pub s3_bucket_name: String,

    /// Key of the object to copy
    #[arg(long, env = "S3_OBJECT_KEY", hide = true)]
    pub s3_object_key: String,
}

impl Args {
    pub fn transfer(&self) -> Transfer {
        Transfer::new(
            self.s3_bucket_name.clone(),
            self.s3_object_key.clone(),
            self.efs_mount_path.clone(),
        )
    }
}
