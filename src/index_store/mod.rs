//! Append-and-sort inverted index, partitioned by word initial letter.
//!
//! Grounded line-for-line in
//! `original_source/services/crawler_service.py` and
//! `original_source/utils/crawler_job.py::_store_words`: each partition
//! file under `data/storage/<letter>.data` holds five space-separated
//! fields per line (`word relevant_url origin_url depth frequency`).
//! `store()` reads the full partition, appends the new entries, sorts by
//! `(word asc, frequency desc)`, and rewrites the whole file — there is no
//! merge of repeated `(word, relevant_url)` pairs, matching the original's
//! observed (not corrected) behavior per spec.md's Open Questions.

use crate::error::Result;
use crate::paths::{partition_letter, DataPaths};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Per-partition write locks, process-wide, keyed by the partition file's
/// path. spec.md §5 notes the read-sort-rewrite cycle below is racy across
/// concurrent jobs sharing a partition and says implementers SHOULD add
/// this; it does not change the on-disk format, only serializes writers.
static PARTITION_LOCKS: Lazy<dashmap::DashMap<PathBuf, &'static Mutex<()>>> = Lazy::new(dashmap::DashMap::new);

fn lock_for(file: &Path) -> &'static Mutex<()> {
    *PARTITION_LOCKS
        .entry(file.to_path_buf())
        .or_insert_with(|| Box::leak(Box::new(Mutex::new(()))))
}

/// One occurrence of a word discovered on a crawled page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub relevant_url: String,
    pub origin_url: String,
    pub depth: u32,
    pub frequency: usize,
}

impl WordEntry {
    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.word, self.relevant_url, self.origin_url, self.depth, self.frequency
        )
    }

    fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(5, ' ');
        let word = parts.next()?.to_string();
        let relevant_url = parts.next()?.to_string();
        let origin_url = parts.next()?.to_string();
        let depth: u32 = parts.next()?.parse().ok()?;
        let frequency: usize = parts.next()?.parse().ok()?;
        Some(Self {
            word,
            relevant_url,
            origin_url,
            depth,
            frequency,
        })
    }
}

/// Appends `entries` (one word -> frequency map for a single page fetch)
/// to the partition files they belong to, rewriting each touched
/// partition fully sorted.
///
/// `entries` is keyed by word; each value is the occurrence count on this
/// page. `relevant_url` is the page the words were found on, `origin_url`
/// is the page that linked to it, `depth` is its crawl depth.
pub async fn store(
    paths: &DataPaths,
    relevant_url: &str,
    origin_url: &str,
    depth: u32,
    word_counts: &HashMap<String, usize>,
) -> Result<()> {
    let mut by_partition: HashMap<&'static str, Vec<WordEntry>> = HashMap::new();
    for (word, frequency) in word_counts {
        let letter = partition_letter(word);
        by_partition
            .entry(letter)
            .or_default()
            .push(WordEntry {
                word: word.clone(),
                relevant_url: relevant_url.to_string(),
                origin_url: origin_url.to_string(),
                depth,
                frequency: *frequency,
            });
    }

    for (letter, new_entries) in by_partition {
        let file = paths.storage_file(letter);
        append_and_sort(&file, new_entries).await?;
    }

    Ok(())
}

async fn append_and_sort(file: &Path, new_entries: Vec<WordEntry>) -> Result<()> {
    let lock = lock_for(file);
    let _guard = lock.lock().await;

    let mut entries = load_partition(file).await?;
    entries.extend(new_entries);
    entries.sort_by(|a, b| a.word.cmp(&b.word).then(b.frequency.cmp(&a.frequency)));

    let body = entries
        .iter()
        .map(WordEntry::to_line)
        .collect::<Vec<_>>()
        .join("\n");
    let body = if body.is_empty() {
        body
    } else {
        format!("{body}\n")
    };

    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(file, body).await?;
    Ok(())
}

/// Loads one partition file into a flat list, tolerating malformed lines
/// (skipped, matching `_load_word_data`'s `except ValueError: continue`).
pub async fn load_partition(file: &Path) -> Result<Vec<WordEntry>> {
    match tokio::fs::read_to_string(file).await {
        Ok(content) => Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(WordEntry::parse_line)
            .collect()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}

/// Lists every partition letter that currently has a non-empty file under
/// `storage/`, used by [`crate::job_registry`] statistics and
/// [`crate::search::random_word`].
pub async fn existing_partitions(paths: &DataPaths) -> Result<Vec<String>> {
    let dir = paths.storage_dir();
    let mut letters = Vec::new();
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(letters),
        Err(err) => return Err(err.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if let Some(letter) = name.strip_suffix(".data") {
                letters.push(letter.to_string());
            }
        }
    }
    Ok(letters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn store_appends_and_sorts_by_word_then_frequency_desc() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());

        let mut first = HashMap::new();
        first.insert("rust".to_string(), 3);
        first.insert("crab".to_string(), 1);
        store(&paths, "https://a.example/1", "https://a.example/", 0, &first)
            .await
            .unwrap();

        let mut second = HashMap::new();
        second.insert("rust".to_string(), 9);
        store(&paths, "https://a.example/2", "https://a.example/1", 1, &second)
            .await
            .unwrap();

        let entries = load_partition(&paths.storage_file("r")).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "rust");
        assert_eq!(entries[0].frequency, 9);
        assert_eq!(entries[1].frequency, 3);

        let crab_entries = load_partition(&paths.storage_file("c")).await.unwrap();
        assert_eq!(crab_entries.len(), 1);
    }

    #[test]
    fn parse_line_skips_malformed_rows() {
        assert!(WordEntry::parse_line("rust https://a https://b 0 nope").is_none());
        assert!(WordEntry::parse_line("rust https://a https://b 0").is_none());
        assert!(WordEntry::parse_line("rust https://a https://b 0 3").is_some());
    }
}
