//! Bounded BFS frontier for one crawl job.
//!
//! spec.md §5 calls for a bounded FIFO with 1-second enqueue/dequeue
//! timeouts. The teacher's concurrency idiom for that would be a
//! `tokio::sync::mpsc::channel`, but the checkpoint writer in
//! [`crate::crawl_job::checkpoint`] needs to serialize the queue's full
//! contents to `<job_id>.queue` after every mutation, and `mpsc::Receiver`
//! doesn't expose its buffered items. This uses a `tokio::sync::Mutex`-
//! guarded `VecDeque` plus a `Notify` instead, which gives the same
//! bounded-capacity, timeout-capable enqueue/dequeue contract while
//! staying inspectable.

use crate::crawl_job::checkpoint::PendingEntry;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

pub struct BoundedQueue {
    capacity: usize,
    items: Mutex<VecDeque<PendingEntry>>,
    not_empty: Notify,
    not_full: Notify,
}

impl BoundedQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::new()),
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }

    pub fn from_entries(capacity: usize, entries: Vec<PendingEntry>) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::from(entries)),
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }

    /// Attempts to push `entry`, waiting up to 1s for room. Returns `false`
    /// if the queue stayed full for the whole timeout (the "Queue full,
    /// pausing URL discovery" case in the original worker loop).
    pub async fn try_enqueue(&self, entry: PendingEntry) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            {
                let mut items = self.items.lock().await;
                if items.len() < self.capacity {
                    items.push_back(entry);
                    self.not_empty.notify_one();
                    return true;
                }
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if tokio::time::timeout(remaining, self.not_full.notified())
                .await
                .is_err()
            {
                return false;
            }
        }
    }

    /// Waits up to 1s for an item, returning `None` on timeout.
    pub async fn try_dequeue(&self) -> Option<PendingEntry> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            {
                let mut items = self.items.lock().await;
                if let Some(entry) = items.pop_front() {
                    self.not_full.notify_one();
                    return Some(entry);
                }
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }
            if tokio::time::timeout(remaining, self.not_empty.notified())
                .await
                .is_err()
            {
                return None;
            }
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<PendingEntry> {
        self.items.lock().await.iter().cloned().collect()
    }
}
