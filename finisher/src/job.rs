/// Position of this container inside its array job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayJob {
    pub index: u64,
    pub size: u64,
    /// Batch job id, `<parent id>:<index>` for array children.
    pub job_id: String,
}

impl ArrayJob {
    pub fn new(index: u64, size: u64, job_id: impl Into<String>) -> Self {
        Self {
            index,
            size,
            job_id: job_id.into(),
        }
    }

    /// True for the element that publishes the result.
    pub fn is_last(&self) -> bool {
        self.index.checked_add(1) == Some(self.size)
    }

    pub fn job_id_without_index(&self) -> &str {
        self.job_id
            .split_once(':')
            .map_or(self.job_id.as_str(), |(id, _)| id)
    }
}
