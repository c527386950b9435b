//! Pause/stop control for a running crawl job.
//!
//! Substitutes a `tokio::sync::Notify` pair plus `AtomicBool` latches for
//! the original's two `threading.Event`s (`_pause_event`/`_stop_event`),
//! preserving the exact semantics from
//! `original_source/utils/crawler_job.py::pause`/`resume`/`stop`: stopping
//! a paused job also releases the pause, so the worker can observe
//! termination instead of sleeping forever.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

pub struct JobSignals {
    paused: AtomicBool,
    stopped: AtomicBool,
    resume_notify: Notify,
}

impl JobSignals {
    #[must_use]
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            resume_notify: Notify::new(),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        // `notify_one` (not `notify_waiters`) so a permit is stored even if
        // no worker is waiting yet, closing the race between this store and
        // the worker's next `wait_while_paused` call.
        self.resume_notify.notify_one();
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        // A stop must wake a paused worker so it can observe is_stopped().
        self.paused.store(false, Ordering::SeqCst);
        self.resume_notify.notify_one();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Blocks the worker while paused, returning as soon as either
    /// `resume()` or `stop()` is called.
    pub async fn wait_while_paused(&self) {
        while self.is_paused() && !self.is_stopped() {
            self.resume_notify.notified().await;
        }
    }
}

impl Default for JobSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn stop_wakes_a_paused_worker() {
        let signals = Arc::new(JobSignals::new());
        signals.pause();

        let waiter = {
            let signals = Arc::clone(&signals);
            tokio::spawn(async move {
                signals.wait_while_paused().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        signals.stop();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("worker should have woken on stop")
            .unwrap();
        assert!(signals.is_stopped());
    }

    #[tokio::test]
    async fn resume_wakes_a_paused_worker() {
        let signals = Arc::new(JobSignals::new());
        signals.pause();

        let waiter = {
            let signals = Arc::clone(&signals);
            tokio::spawn(async move {
                signals.wait_while_paused().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        signals.resume();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("worker should have woken on resume")
            .unwrap();
        assert!(!signals.is_paused());
    }
}
