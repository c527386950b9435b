//! The global, append-only `data/visited_urls.data` log.
//!
//! Grounded in `original_source/utils/crawler_job.py::_save_visited_url`
//! and `_load_visited_urls`: one line per visit, `<url> <job_id>
//! <iso8601_datetime>`, space-separated. Lines with fewer than three
//! fields are skipped on load rather than treated as an error, matching
//! the original's tolerant parsing.

use crate::error::Result;
use crate::paths::DataPaths;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct VisitedEntry {
    pub url: String,
    pub job_id: String,
    pub visited_at: DateTime<Utc>,
}

/// Appends one visit record. Errors are logged and swallowed by the
/// caller (the crawl worker never fails an operation over a local I/O
/// hiccup, per spec.md §7), so this returns `Result` for the caller to
/// decide.
pub async fn record_visit(paths: &DataPaths, url: &str, job_id: &str) -> Result<()> {
    let file = paths.visited_urls_file();
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let line = format!("{url} {job_id} {}\n", Utc::now().to_rfc3339());

    let mut handle = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&file)
        .await?;
    handle.write_all(line.as_bytes()).await?;
    Ok(())
}

/// Loads every tolerable line in the visited log.
pub async fn load_all(paths: &DataPaths) -> Result<Vec<VisitedEntry>> {
    let file = paths.visited_urls_file();
    let content = match tokio::fs::read_to_string(&file).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    Ok(content.lines().filter_map(parse_line).collect())
}

/// Loads the set of URLs a specific job has already visited, used to
/// reconstruct the in-memory `visited` set on resume.
pub async fn load_for_job(paths: &DataPaths, job_id: &str) -> Result<std::collections::HashSet<String>> {
    Ok(load_all(paths)
        .await?
        .into_iter()
        .filter(|entry| entry.job_id == job_id)
        .map(|entry| entry.url)
        .collect())
}

fn parse_line(line: &str) -> Option<VisitedEntry> {
    let mut parts = line.split(' ');
    let url = parts.next()?.to_string();
    let job_id = parts.next()?.to_string();
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return None;
    }
    let visited_at = DateTime::parse_from_rfc3339(&rest.join(" "))
        .ok()?
        .with_timezone(&Utc);
    Some(VisitedEntry {
        url,
        job_id,
        visited_at,
    })
}
