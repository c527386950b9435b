//! Crawl Job (spec component C4): a bounded BFS crawl from one origin URL.

pub mod checkpoint;
pub mod fetch;
mod job_id;
mod queue;
mod rate_limiter;
pub mod signals;
pub mod worker;

pub use checkpoint::{JobState, PendingEntry};
pub use job_id::JobId;
pub use worker::{JobHandle, JobSnapshot};

use crate::error::{Error, Result};
use crate::paths::DataPaths;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Everything read back from a job's checkpoint files in order to resume
/// it, assembled the way
/// `original_source/utils/crawler_job.py::_resume_from_files` does:
/// status is reset to Active, `completed_at` is cleared, and `created_at`
/// from the existing status file is preserved.
pub struct ResumeData {
    pub urls_visited: usize,
    pub pending: Vec<PendingEntry>,
    pub logs: Vec<String>,
    pub visited: HashSet<String>,
    pub created_at: DateTime<Utc>,
}

/// Loads a job's checkpoint files back into [`ResumeData`]. Returns
/// `Error::NotFound` if no status file exists for `job_id`.
pub async fn load_resume_data(paths: &DataPaths, job_id: &str) -> Result<ResumeData> {
    let status = checkpoint::read_status(paths, job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no checkpoint for job {job_id}")))?;

    let pending = checkpoint::read_queue(paths, job_id).await?;
    let logs = checkpoint::read_logs(paths, job_id).await?;
    let visited = crate::visited_log::load_for_job(paths, job_id).await?;

    Ok(ResumeData {
        urls_visited: status.urls_visited,
        pending,
        logs,
        visited,
        created_at: status.created_at,
    })
}
