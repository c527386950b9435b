//! Job Registry & Lifecycle Manager (spec component C5).
//!
//! Grounded in `original_source/services/crawler_service.py`'s
//! `CrawlerService`: `create_crawler`, `get_crawler_status`,
//! `list_crawlers`, `stop_crawler`/`pause_crawler`/`resume_crawler`,
//! `resume_crawler_from_files`, `clear_all_data`, `get_statistics`, and
//! `get_visited_urls_stats`. The Python dict-of-threads + a module-level
//! lock becomes a `DashMap<JobId, JobHandle>` (the teacher's pervasive
//! lock-free map) guarded additionally by a single `parking_lot::Mutex`
//! for registry-wide mutations, per spec.md §5: "a single mutex... worker
//! execution itself does not hold this mutex."

use crate::config::JobConfig;
use crate::crawl_job::{self, worker, JobHandle, JobId, JobState};
use crate::error::{Error, Result};
use crate::index_store;
use crate::paths::DataPaths;
use crate::visited_log;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;

/// A point-in-time view of a job's status, assembled from its live
/// snapshot (if the task is still running) or its checkpoint files (if it
/// is not), with live/dead reconciliation matching
/// `get_crawler_status`'s handling of a thread that died without updating
/// its status file to `Finished`.
#[derive(Debug, Clone)]
pub struct JobStatusView {
    pub job_id: String,
    pub origin_url: String,
    pub state: String,
    pub urls_visited: usize,
    pub queue_preview: Vec<String>,
    pub recent_logs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Summary row for [`JobRegistry::list`].
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub job_id: String,
    pub origin_url: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters for [`JobRegistry::statistics`].
#[derive(Debug, Clone)]
pub struct Statistics {
    pub total_urls_visited: usize,
    pub total_indexed_words: usize,
    pub total_crawlers_created: usize,
    pub active_crawlers: usize,
}

/// Outcome of [`JobRegistry::clear_all`].
#[derive(Debug, Clone, Default)]
pub struct ClearedCounts {
    pub visited_log_removed: bool,
    pub crawler_files_removed: usize,
    pub storage_files_removed: usize,
}

pub struct JobRegistry {
    paths: DataPaths,
    jobs: DashMap<JobId, JobHandle>,
    // Registry-wide mutations (create/remove entries) serialize through
    // this mutex; a running job's own worker loop never touches it.
    mutation_lock: Mutex<()>,
}

impl JobRegistry {
    #[must_use]
    pub fn new(data_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            paths: DataPaths::new(data_root),
            jobs: DashMap::new(),
            mutation_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub async fn create(&self, config: JobConfig) -> Result<JobId> {
        self.paths.ensure_dirs().await?;
        let _guard = self.mutation_lock.lock();
        let job_id = JobId::generate();
        let handle = worker::spawn(job_id.clone(), config, self.paths.clone());
        self.jobs.insert(job_id.clone(), handle);
        Ok(job_id)
    }

    /// Reconstructs a job from its on-disk checkpoint and resumes crawling.
    /// Refuses if a job with this id is already live, matching
    /// `resume_crawler_from_files`'s "already alive" guard.
    pub async fn resume_from_files(&self, job_id: &str) -> Result<()> {
        let job_id_typed = JobId::from(job_id.to_string());
        if self.jobs.contains_key(&job_id_typed) {
            return Err(Error::Conflict(format!("job {job_id} is already running")));
        }

        let status = crate::crawl_job::checkpoint::read_status(&self.paths, job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no checkpoint for job {job_id}")))?;

        let config = JobConfig::builder(status.origin_url.clone())
            .max_depth(status.max_depth)
            .hit_rate(status.hit_rate)
            .max_queue_capacity(status.max_queue_capacity)
            .max_urls_to_visit(status.max_urls_to_visit)
            .build()?;

        let resume_data = crawl_job::load_resume_data(&self.paths, job_id).await?;

        let _guard = self.mutation_lock.lock();
        let handle = worker::spawn_resumed(job_id_typed.clone(), config, self.paths.clone(), resume_data);
        self.jobs.insert(job_id_typed, handle);
        Ok(())
    }

    pub fn pause(&self, job_id: &str) -> Result<()> {
        let key = JobId::from(job_id.to_string());
        let handle = self
            .jobs
            .get(&key)
            .ok_or_else(|| Error::NotFound(format!("job {job_id} is not active")))?;
        if handle.snapshot.read().state != JobState::Active {
            return Err(Error::Conflict(format!("job {job_id} is not active")));
        }
        handle.signals.pause();
        // The worker only reconciles `snapshot.state` against the pause
        // signal once it reaches its next loop iteration (after its
        // current fetch, if any, completes) — writing `Paused` here means
        // `status()` reports it immediately rather than lagging behind the
        // live pause state.
        handle.snapshot.write().state = JobState::Paused;
        Ok(())
    }

    pub fn resume(&self, job_id: &str) -> Result<()> {
        let key = JobId::from(job_id.to_string());
        let handle = self
            .jobs
            .get(&key)
            .ok_or_else(|| Error::NotFound(format!("job {job_id} is not active")))?;
        if handle.snapshot.read().state != JobState::Paused {
            return Err(Error::Conflict(format!("job {job_id} is not paused")));
        }
        handle.signals.resume();
        handle.snapshot.write().state = JobState::Active;
        Ok(())
    }

    /// Requests a stop; returns `"already_finished"` via
    /// `Error::Conflict` if the job's checkpoint already reports
    /// `Finished`, matching `stop_crawler`'s short-circuit.
    pub fn stop(&self, job_id: &str) -> Result<()> {
        let key = JobId::from(job_id.to_string());
        let handle = self
            .jobs
            .get(&key)
            .ok_or_else(|| Error::NotFound(format!("job {job_id} is not active")))?;
        if handle.snapshot.read().state == JobState::Finished {
            return Err(Error::Conflict(format!("job {job_id} is already finished")));
        }
        handle.signals.stop();
        Ok(())
    }

    /// Reads back a job's live-or-checkpointed status. Reconciles a dead
    /// task whose status file was never updated to `Finished`/
    /// `Interrupted` by reporting it as stopped, matching
    /// `get_crawler_status`'s dead-thread handling.
    pub async fn status(&self, job_id: &str) -> Result<JobStatusView> {
        let key = JobId::from(job_id.to_string());

        if let Some(handle) = self.jobs.get(&key) {
            if !handle.task.is_finished() {
                let snap = handle.snapshot.read().clone();
                let logs = crate::crawl_job::checkpoint::read_logs(&self.paths, job_id)
                    .await
                    .unwrap_or_default();
                let pending = crate::crawl_job::checkpoint::read_queue(&self.paths, job_id)
                    .await
                    .unwrap_or_default();
                return Ok(JobStatusView {
                    job_id: job_id.to_string(),
                    origin_url: handle.config.origin_url().to_string(),
                    state: snap.state.as_str().to_string(),
                    urls_visited: snap.urls_visited,
                    queue_preview: pending
                        .iter()
                        .map(|entry| format!("{} (depth: {})", entry.url, entry.depth))
                        .collect(),
                    recent_logs: last_n(&logs, 50),
                    created_at: snap.created_at,
                    updated_at: snap.updated_at,
                    completed_at: snap.completed_at,
                });
            }
        }

        // Either never tracked in this process or the task has finished:
        // drop the dead entry (if present) and fall back to the
        // checkpoint files on disk.
        self.jobs.remove(&key);

        let status = crate::crawl_job::checkpoint::read_status(&self.paths, job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no such job: {job_id}")))?;
        let logs = crate::crawl_job::checkpoint::read_logs(&self.paths, job_id).await?;
        let pending = crate::crawl_job::checkpoint::read_queue(&self.paths, job_id).await?;

        let reported_state = if status.state == JobState::Finished {
            "Finished".to_string()
        } else {
            "Stopped".to_string()
        };

        Ok(JobStatusView {
            job_id: job_id.to_string(),
            origin_url: status.origin_url,
            state: reported_state,
            urls_visited: status.urls_visited,
            queue_preview: pending
                .iter()
                .map(|entry| format!("{} (depth: {})", entry.url, entry.depth))
                .collect(),
            recent_logs: last_n(&logs, 50),
            created_at: status.created_at,
            updated_at: status.updated_at,
            completed_at: status.completed_at,
        })
    }

    /// Lists every job this process knows about, newest first, matching
    /// `list_crawlers`'s `created_at`-descending sort.
    pub fn list(&self) -> Vec<JobSummary> {
        let mut summaries: Vec<JobSummary> = self
            .jobs
            .iter()
            .map(|entry| {
                let snap = entry.snapshot.read();
                JobSummary {
                    job_id: entry.job_id.to_string(),
                    origin_url: entry.config.origin_url().to_string(),
                    state: snap.state.as_str().to_string(),
                    created_at: snap.created_at,
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Deletes the visited log and every crawler checkpoint and storage
    /// partition file, matching `clear_all_data`.
    pub async fn clear_all(&self) -> Result<ClearedCounts> {
        let _guard = self.mutation_lock.lock();
        for entry in self.jobs.iter() {
            entry.signals.stop();
        }
        self.jobs.clear();

        let mut cleared = ClearedCounts::default();

        let visited_file = self.paths.visited_urls_file();
        if tokio::fs::try_exists(&visited_file).await.unwrap_or(false) {
            tokio::fs::remove_file(&visited_file).await?;
            cleared.visited_log_removed = true;
        }

        cleared.crawler_files_removed = remove_dir_contents(&self.paths.crawlers_dir()).await?;
        cleared.storage_files_removed = remove_dir_contents(&self.paths.storage_dir()).await?;

        Ok(cleared)
    }

    /// Aggregate counters across the whole index and visited log,
    /// matching `get_statistics`.
    pub async fn statistics(&self) -> Result<Statistics> {
        let visited = visited_log::load_all(&self.paths).await?;

        let mut total_indexed_words = 0;
        for letter in index_store::existing_partitions(&self.paths).await? {
            let file = self.paths.storage_file(&letter);
            total_indexed_words += index_store::load_partition(&file).await?.len();
        }

        let total_crawlers_created = count_files_with_suffix(&self.paths.crawlers_dir(), ".data").await?;

        let active_crawlers = self.jobs.iter().filter(|entry| !entry.task.is_finished()).count();

        Ok(Statistics {
            total_urls_visited: visited.len(),
            total_indexed_words,
            total_crawlers_created,
            active_crawlers,
        })
    }

    /// Per-crawler and per-domain visit counts, matching
    /// `get_visited_urls_stats`.
    pub async fn visited_urls_stats(&self) -> Result<VisitedUrlsStats> {
        let visited = visited_log::load_all(&self.paths).await?;

        let mut per_crawler: HashMap<String, usize> = HashMap::new();
        let mut per_domain: HashMap<String, usize> = HashMap::new();
        for entry in &visited {
            *per_crawler.entry(entry.job_id.clone()).or_insert(0) += 1;
            if let Ok(parsed) = url::Url::parse(&entry.url) {
                if let Some(host) = parsed.host_str() {
                    *per_domain.entry(host.to_string()).or_insert(0) += 1;
                }
            }
        }

        let mut recent = visited;
        recent.sort_by(|a, b| b.visited_at.cmp(&a.visited_at));
        recent.truncate(10);

        Ok(VisitedUrlsStats {
            per_crawler,
            per_domain,
            recent_urls: recent.into_iter().map(|entry| entry.url).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct VisitedUrlsStats {
    pub per_crawler: HashMap<String, usize>,
    pub per_domain: HashMap<String, usize>,
    pub recent_urls: Vec<String>,
}

fn last_n(lines: &[String], n: usize) -> Vec<String> {
    if lines.len() <= n {
        lines.to_vec()
    } else {
        lines[lines.len() - n..].to_vec()
    }
}

async fn remove_dir_contents(dir: &std::path::Path) -> Result<usize> {
    let mut removed = 0;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if entry.path().is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

async fn count_files_with_suffix(dir: &std::path::Path, suffix: &str) -> Result<usize> {
    let mut count = 0;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_then_status_reports_active_job() {
        let dir = TempDir::new().unwrap();
        let registry = JobRegistry::new(dir.path());
        let config = JobConfig::builder("https://example.invalid/").build().unwrap();

        let job_id = registry.create(config).await.unwrap();
        let status = registry.status(job_id.as_str()).await.unwrap();
        assert_eq!(status.origin_url, "https://example.invalid/");

        registry.stop(job_id.as_str()).unwrap();
    }

    #[tokio::test]
    async fn pausing_unknown_job_returns_not_found() {
        let dir = TempDir::new().unwrap();
        let registry = JobRegistry::new(dir.path());
        let err = registry.pause("no-such-job").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn clear_all_removes_checkpoint_and_storage_files() {
        let dir = TempDir::new().unwrap();
        let registry = JobRegistry::new(dir.path());
        registry.paths.ensure_dirs().await.unwrap();
        tokio::fs::write(registry.paths.storage_file("r"), "rust x y 0 1\n")
            .await
            .unwrap();

        let cleared = registry.clear_all().await.unwrap();
        assert_eq!(cleared.storage_files_removed, 1);
    }
}
