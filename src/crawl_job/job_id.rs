//! Job identifiers.
//!
//! Format is exactly `"<epoch_seconds>_<spawn_counter>"`, mirroring
//! `original_source/services/crawler_service.py::create_crawler`, which
//! builds the id from a timestamp and `threading.get_ident()`. Rust has no
//! stable, dependency-free equivalent of a thread id worth reaching for, so
//! this crate substitutes a process-wide monotonic counter — both are
//! "unique within a process lifetime," which is all spec.md requires of a
//! `JobId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SPAWN_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Mints a new, process-unique job id.
    #[must_use]
    pub fn generate() -> Self {
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let spawn = SPAWN_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{epoch_secs}_{spawn}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_ids() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().contains('_'));
    }
}
