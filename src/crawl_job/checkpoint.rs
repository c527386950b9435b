//! Durable checkpoint files for one crawl job.
//!
//! Three files under `data/crawlers/`, matching
//! `original_source/utils/crawler_job.py::_update_status_file`,
//! `_update_logs_file`, and `_update_queue_file` exactly:
//!
//! - `<job_id>.data` — JSON status document.
//! - `<job_id>.logs` — plain text, one line per log entry, fully rewritten
//!   on every update.
//! - `<job_id>.queue` — plain text, `<url> <depth>` per line, fully
//!   rewritten on every update.

use crate::config::JobConfig;
use crate::error::Result;
use crate::paths::DataPaths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Active,
    Paused,
    Finished,
    Interrupted,
}

impl JobState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Active => "Active",
            JobState::Paused => "Paused",
            JobState::Finished => "Finished",
            JobState::Interrupted => "Interrupted",
        }
    }
}

/// The `<job_id>.data` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDocument {
    pub job_id: String,
    pub origin_url: String,
    pub max_depth: u32,
    pub hit_rate: f64,
    pub max_queue_capacity: usize,
    pub max_urls_to_visit: usize,
    pub state: JobState,
    pub urls_visited: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StatusDocument {
    #[must_use]
    pub fn new(job_id: &str, config: &JobConfig) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.to_string(),
            origin_url: config.origin_url().to_string(),
            max_depth: config.max_depth(),
            hit_rate: config.hit_rate(),
            max_queue_capacity: config.max_queue_capacity(),
            max_urls_to_visit: config.max_urls_to_visit(),
            state: JobState::Active,
            urls_visited: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

/// `<url> <depth>` entries pending in the BFS queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub url: String,
    pub depth: u32,
}

pub async fn write_status(paths: &DataPaths, job_id: &str, doc: &StatusDocument) -> Result<()> {
    let file = paths.status_file(job_id);
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_string_pretty(doc)?;
    tokio::fs::write(file, body).await?;
    Ok(())
}

pub async fn read_status(paths: &DataPaths, job_id: &str) -> Result<Option<StatusDocument>> {
    let file = paths.status_file(job_id);
    match tokio::fs::read_to_string(&file).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Rewrites the full logs file, keeping only the most recent 50 lines on
/// disk is the registry's concern (`_update_logs_file` itself keeps
/// everything); this just performs the atomic-enough full rewrite.
pub async fn write_logs(paths: &DataPaths, job_id: &str, lines: &[String]) -> Result<()> {
    let file = paths.logs_file(job_id);
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    };
    tokio::fs::write(file, body).await?;
    Ok(())
}

pub async fn read_logs(paths: &DataPaths, job_id: &str) -> Result<Vec<String>> {
    let file = paths.logs_file(job_id);
    match tokio::fs::read_to_string(&file).await {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}

pub async fn write_queue(paths: &DataPaths, job_id: &str, pending: &[PendingEntry]) -> Result<()> {
    let file = paths.queue_file(job_id);
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = pending
        .iter()
        .map(|entry| format!("{} {}", entry.url, entry.depth))
        .collect::<Vec<_>>()
        .join("\n");
    let body = if body.is_empty() { body } else { format!("{body}\n") };
    tokio::fs::write(file, body).await?;
    Ok(())
}

pub async fn read_queue(paths: &DataPaths, job_id: &str) -> Result<Vec<PendingEntry>> {
    let file = paths.queue_file(job_id);
    let content = match tokio::fs::read_to_string(&file).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    Ok(content
        .lines()
        .filter_map(|line| {
            let mut parts = line.rsplitn(2, ' ');
            let depth: u32 = parts.next()?.parse().ok()?;
            let url = parts.next()?.to_string();
            Some(PendingEntry { url, depth })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn status_round_trips() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let config = JobConfig::builder("https://example.com").build().unwrap();
        let doc = StatusDocument::new("123_0", &config);

        write_status(&paths, "123_0", &doc).await.unwrap();
        let loaded = read_status(&paths, "123_0").await.unwrap().unwrap();
        assert_eq!(loaded.job_id, "123_0");
        assert_eq!(loaded.state, JobState::Active);
    }

    #[tokio::test]
    async fn queue_round_trips() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let pending = vec![
            PendingEntry { url: "https://a.example/".to_string(), depth: 0 },
            PendingEntry { url: "https://b.example/".to_string(), depth: 1 },
        ];
        write_queue(&paths, "123_0", &pending).await.unwrap();
        let loaded = read_queue(&paths, "123_0").await.unwrap();
        assert_eq!(loaded, pending);
    }

    #[tokio::test]
    async fn missing_queue_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        assert!(read_queue(&paths, "missing").await.unwrap().is_empty());
    }
}
