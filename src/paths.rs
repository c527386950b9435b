//! Layout of the on-disk `data/` root shared by the index store, visited
//! log, and crawl job checkpoints.
//!
//! The original Python service hardcodes `"data"` relative to the process
//! CWD; this crate takes the root as a constructor argument instead (the
//! idiomatic substitution for a global constant), matching the teacher's
//! `storage_dir` field on `CrawlConfig`.

use std::path::{Path, PathBuf};

/// Handle bundling the three directories rooted at `data_root`.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `data/crawlers/` — per-job checkpoint files (`<job_id>.data`,
    /// `.logs`, `.queue`).
    #[must_use]
    pub fn crawlers_dir(&self) -> PathBuf {
        self.root.join("crawlers")
    }

    /// `data/storage/` — inverted index partitions (`<letter>.data`).
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.root.join("storage")
    }

    /// `data/visited_urls.data` — the global append-only visited log.
    #[must_use]
    pub fn visited_urls_file(&self) -> PathBuf {
        self.root.join("visited_urls.data")
    }

    pub fn status_file(&self, job_id: &str) -> PathBuf {
        self.crawlers_dir().join(format!("{job_id}.data"))
    }

    pub fn logs_file(&self, job_id: &str) -> PathBuf {
        self.crawlers_dir().join(format!("{job_id}.logs"))
    }

    pub fn queue_file(&self, job_id: &str) -> PathBuf {
        self.crawlers_dir().join(format!("{job_id}.queue"))
    }

    pub fn storage_file(&self, letter: &str) -> PathBuf {
        self.storage_dir().join(format!("{letter}.data"))
    }

    /// Create `crawlers/` and `storage/` if they don't already exist.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.crawlers_dir()).await?;
        tokio::fs::create_dir_all(self.storage_dir()).await?;
        Ok(())
    }
}

/// Maps a word's first character to its partition letter: `a`..`z` for
/// ASCII letters (case-folded), `other` for anything else. Mirrors
/// `search_service.py::_get_alphabet_files`.
#[must_use]
pub fn partition_letter(word: &str) -> &'static str {
    const LETTERS: [&str; 26] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r",
        "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    match word.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => LETTERS[(c.to_ascii_lowercase() as u8 - b'a') as usize],
        _ => "other",
    }
}
