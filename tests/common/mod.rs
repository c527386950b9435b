use crawlidx::JobRegistry;
use tempfile::TempDir;

/// A registry rooted in a fresh temp directory, dropped (and the
/// directory removed) when the returned `TempDir` goes out of scope.
pub fn registry() -> (JobRegistry, TempDir) {
    let dir = TempDir::new().expect("create temp data dir");
    let registry = JobRegistry::new(dir.path());
    (registry, dir)
}

/// Polls `registry.status(job_id)` until it reports a terminal state or
/// `attempts` polls have elapsed.
pub async fn wait_for_terminal_state(registry: &JobRegistry, job_id: &str, attempts: usize) -> String {
    for _ in 0..attempts {
        let status = registry.status(job_id).await.expect("job has a status");
        if matches!(status.state.as_str(), "Finished" | "Stopped" | "Interrupted") {
            return status.state;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    registry.status(job_id).await.expect("job has a status").state
}
