use crate::job::ArrayJob;
use clap::Parser;

/// Settings come from the variables AWS Batch sets on every array child; the
/// long flags only exist for running the step by hand.
#[derive(Parser, Debug)]
#[command(
    name = "batch-finisher",
    about = "Publish the shared result file from the last element of an array job"
)]
pub struct Args {
    /// JSON document passed by the job definition
    #[arg(value_name = "JSON", allow_hyphen_values = true)]
    pub payload: String,

    /// Deployment label
    #[arg(long, env = "TEST_ENV", hide = true)]
    pub test_env: String,

    /// Index of this child inside the array job
    #[arg(long, env = "AWS_BATCH_JOB_ARRAY_INDEX", hide = true)]
    pub array_index: u64,

    /// Number of children in the array job
    #[arg(long, env = "AWS_BATCH_JOB_ARRAY_SIZE", hide = true)]
    pub array_size: u64,

    /// Batch job id
    #[arg(long, env = "AWS_BATCH_JOB_ID", hide = true)]
    pub job_id: String,
}

impl Args {
    pub fn array_job(&self) -> ArrayJob {
        ArrayJob::new(self.array_index, self.array_size, self.job_id.clone())
    }
}
