//! The crawl worker: one Tokio task running a bounded BFS over a single
//! origin URL.
//!
//! This is the idiomatic Rust substitution for
//! `original_source/utils/crawler_job.py::CrawlerJob.run` — a
//! `threading.Thread` subclass there, a plain `tokio::spawn`'d future here
//! (spec.md §5's "preemptively scheduled independent execution unit").
//! The control flow (enqueue origin, pop-with-timeout, depth gate, rate
//! limit, fetch, extract, store, re-enqueue discovered links, final state
//! transition) mirrors `run()` line for line.

use crate::config::JobConfig;
use crate::crawl_job::checkpoint::{self, JobState, PendingEntry, StatusDocument};
use crate::crawl_job::queue::BoundedQueue;
use crate::crawl_job::rate_limiter::RateLimiter;
use crate::crawl_job::signals::JobSignals;
use crate::crawl_job::job_id::JobId;
use crate::crawl_job::{fetch, ResumeData};
use crate::html_extractor;
use crate::index_store;
use crate::paths::DataPaths;
use crate::visited_log;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Live, lock-cheap snapshot the registry reads without joining the
/// worker task.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub state: JobState,
    pub urls_visited: usize,
    pub queue_len: usize,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
}

/// Everything the registry needs to control and observe a live job.
pub struct JobHandle {
    pub job_id: JobId,
    pub config: JobConfig,
    pub signals: Arc<JobSignals>,
    pub snapshot: Arc<RwLock<JobSnapshot>>,
    pub task: tokio::task::JoinHandle<()>,
}

/// Spawns the worker task for a brand-new job.
pub fn spawn(job_id: JobId, config: JobConfig, paths: DataPaths) -> JobHandle {
    let now = Utc::now();
    let snapshot = Arc::new(RwLock::new(JobSnapshot {
        state: JobState::Active,
        urls_visited: 0,
        queue_len: 1,
        created_at: now,
        updated_at: now,
        completed_at: None,
    }));
    let signals = Arc::new(JobSignals::new());

    let queue = BoundedQueue::new(config.max_queue_capacity());
    let origin = config.origin_url().to_string();

    let task = {
        let job_id = job_id.clone();
        let config = config.clone();
        let snapshot = Arc::clone(&snapshot);
        let signals = Arc::clone(&signals);
        tokio::spawn(async move {
            let visited = HashSet::new();
            let entry = PendingEntry { url: origin, depth: 0 };
            // Capacity is always >=100 (JobConfigBuilder validation), so a
            // fresh queue can always take the origin entry immediately.
            let _ = queue.try_enqueue(entry).await;
            run(job_id, config, paths, queue, visited, signals, snapshot, 0, Vec::new()).await;
        })
    };

    JobHandle {
        job_id,
        config,
        signals,
        snapshot,
        task,
    }
}

/// Spawns the worker task for a job resumed from its checkpoint files.
///
/// `resume.pending` is silently truncated by `original_source`'s
/// `_resume_from_files`, but spec.md §9's Open Questions requires this
/// crate to log the truncation rather than stay silent about it.
pub fn spawn_resumed(job_id: JobId, config: JobConfig, paths: DataPaths, mut resume: ResumeData) -> JobHandle {
    let capacity = config.max_queue_capacity();
    let mut logs = resume.logs;
    if resume.pending.len() > capacity {
        let dropped = resume.pending.len() - capacity;
        resume.pending.truncate(capacity);
        logs.push(format!(
            "{} resumed queue had {} entries, truncated {dropped} to fit max_queue_capacity={capacity}",
            Utc::now().to_rfc3339(),
            resume.pending.len() + dropped,
        ));
    }

    let snapshot = Arc::new(RwLock::new(JobSnapshot {
        state: JobState::Active,
        urls_visited: resume.urls_visited,
        queue_len: resume.pending.len(),
        created_at: resume.created_at,
        updated_at: Utc::now(),
        completed_at: None,
    }));
    let signals = Arc::new(JobSignals::new());

    let queue = BoundedQueue::from_entries(capacity, resume.pending);

    let task = {
        let job_id = job_id.clone();
        let config = config.clone();
        let snapshot = Arc::clone(&snapshot);
        let signals = Arc::clone(&signals);
        let visited = resume.visited;
        let urls_visited = resume.urls_visited;
        tokio::spawn(async move {
            run(job_id, config, paths, queue, visited, signals, snapshot, urls_visited, logs).await;
        })
    };

    JobHandle {
        job_id,
        config,
        signals,
        snapshot,
        task,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run(
    job_id: JobId,
    config: JobConfig,
    paths: DataPaths,
    queue: BoundedQueue,
    mut visited: HashSet<String>,
    signals: Arc<JobSignals>,
    snapshot: Arc<RwLock<JobSnapshot>>,
    mut urls_visited: usize,
    mut logs: Vec<String>,
) {
    let rate_limiter = RateLimiter::new(config.hit_rate());
    let job_id_str = job_id.as_str().to_string();

    log_line(&mut logs, format!("job {job_id_str} starting at {}", config.origin_url()));
    persist_logs(&paths, &job_id_str, &logs).await;
    // Write the state file immediately on start (spec.md §3 Lifecycle),
    // so a crash before the first queue iteration still leaves a
    // resumable checkpoint on disk.
    persist_status(&paths, &job_id_str, &config, JobState::Active, urls_visited, &snapshot).await;

    let mut final_state = JobState::Finished;

    loop {
        if signals.is_stopped() {
            final_state = JobState::Interrupted;
            log_line(&mut logs, "stop requested".to_string());
            break;
        }

        signals.wait_while_paused().await;
        {
            let mut snap = snapshot.write();
            snap.state = if signals.is_paused() { JobState::Paused } else { JobState::Active };
        }

        if signals.is_stopped() {
            final_state = JobState::Interrupted;
            break;
        }

        let Some(entry) = queue.try_dequeue().await else {
            if queue.is_empty().await {
                break;
            }
            continue;
        };
        persist_queue(&paths, &job_id_str, &queue).await;

        if entry.depth > config.max_depth() {
            continue;
        }

        // Rate limiting runs before the visited check, matching the
        // original worker's `_crawl_url` (`_rate_limit()` is the first
        // line, the `visited_urls` short-circuit the second).
        rate_limiter.acquire().await;

        if visited.contains(&entry.url) {
            continue;
        }

        match fetch::fetch(&entry.url).await {
            Ok(page) if page.status.is_success() => {
                visited.insert(entry.url.clone());
                let _ = visited_log::record_visit(&paths, &entry.url, &job_id_str).await;

                if let Ok(base) = Url::parse(&entry.url) {
                    let extracted = html_extractor::extract(&page.body, &base);
                    let word_counts = html_extractor::word_frequencies(&extracted.text);
                    if !word_counts.is_empty() {
                        if let Err(err) =
                            index_store::store(&paths, &entry.url, config.origin_url(), entry.depth, &word_counts)
                                .await
                        {
                            log_line(&mut logs, format!("failed to store words for {}: {err}", entry.url));
                        }
                    }

                    urls_visited += 1;

                    if config.max_urls_to_visit() != 0 && urls_visited >= config.max_urls_to_visit() {
                        log_line(&mut logs, "reached max_urls_to_visit, stopping discovery".to_string());
                        break;
                    }

                    if entry.depth < config.max_depth() && !signals.is_stopped() {
                        for link in extracted.links {
                            let link_str = link.to_string();
                            if visited.contains(&link_str) {
                                continue;
                            }
                            let queued = queue
                                .try_enqueue(PendingEntry { url: link_str, depth: entry.depth + 1 })
                                .await;
                            if !queued {
                                log_line(&mut logs, "Queue full, pausing URL discovery".to_string());
                                break;
                            }
                        }
                    }
                }
            }
            Ok(page) => {
                log_line(&mut logs, format!("{} returned status {}", entry.url, page.status));
            }
            Err(err) => {
                log_line(&mut logs, format!("failed to fetch {}: {err}", entry.url));
            }
        }

        persist_queue(&paths, &job_id_str, &queue).await;

        let queue_len = queue.snapshot().await.len();
        {
            let mut snap = snapshot.write();
            snap.urls_visited = urls_visited;
            snap.queue_len = queue_len;
            snap.updated_at = Utc::now();
        }
        persist_status(&paths, &job_id_str, &config, JobState::Active, urls_visited, &snapshot).await;
        persist_logs(&paths, &job_id_str, &logs).await;
    }

    log_line(&mut logs, format!("job {job_id_str} finished with state {}", final_state.as_str()));
    {
        let mut snap = snapshot.write();
        snap.state = final_state;
        snap.urls_visited = urls_visited;
        snap.completed_at = Some(Utc::now());
        snap.updated_at = Utc::now();
    }
    persist_status(&paths, &job_id_str, &config, final_state, urls_visited, &snapshot).await;
    persist_logs(&paths, &job_id_str, &logs).await;
}

fn log_line(logs: &mut Vec<String>, message: String) {
    logs.push(format!("{} {message}", Utc::now().to_rfc3339()));
}

async fn persist_logs(paths: &DataPaths, job_id: &str, logs: &[String]) {
    if let Err(err) = checkpoint::write_logs(paths, job_id, logs).await {
        log::warn!("failed to write logs for job {job_id}: {err}");
    }
}

async fn persist_queue(paths: &DataPaths, job_id: &str, queue: &BoundedQueue) {
    let pending = queue.snapshot().await;
    if let Err(err) = checkpoint::write_queue(paths, job_id, &pending).await {
        log::warn!("failed to write queue for job {job_id}: {err}");
    }
}

async fn persist_status(
    paths: &DataPaths,
    job_id: &str,
    config: &JobConfig,
    state: JobState,
    urls_visited: usize,
    snapshot: &Arc<RwLock<JobSnapshot>>,
) {
    let (created_at, completed_at) = {
        let snap = snapshot.read();
        (snap.created_at, snap.completed_at)
    };
    let doc = StatusDocument {
        job_id: job_id.to_string(),
        origin_url: config.origin_url().to_string(),
        max_depth: config.max_depth(),
        hit_rate: config.hit_rate(),
        max_queue_capacity: config.max_queue_capacity(),
        max_urls_to_visit: config.max_urls_to_visit(),
        state,
        urls_visited,
        created_at,
        updated_at: Utc::now(),
        completed_at,
    };
    if let Err(err) = checkpoint::write_status(paths, job_id, &doc).await {
        log::warn!("failed to write status for job {job_id}: {err}");
    }
}
