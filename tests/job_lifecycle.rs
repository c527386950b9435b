//! Pause/stop/list/clear_all lifecycle scenarios from spec.md §8.

mod common;

use crawlidx::JobConfig;
use std::time::Duration;

#[tokio::test]
async fn pause_then_stop_is_observed_before_any_fetch() {
    let (registry, _dir) = common::registry();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><body>no links here</body></html>")
        .expect(0)
        .create_async()
        .await;

    let origin = format!("{}/", server.url());
    let config = JobConfig::builder(origin).hit_rate(0.5).build().unwrap();
    let job_id = registry.create(config).await.unwrap();

    // No await happens between create() returning and pause() below, so
    // the newly spawned worker task cannot have been polled yet: this
    // pause is guaranteed to land before the worker's first loop
    // iteration.
    registry.pause(job_id.as_str()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let status = registry.status(job_id.as_str()).await.unwrap();
    assert_eq!(status.state, "Paused");

    // Likewise, resume() and stop() run back to back with no
    // intervening await, so the worker observes is_stopped() as soon as
    // it wakes from the pause wait and never reaches the fetch.
    registry.resume(job_id.as_str()).unwrap();
    registry.stop(job_id.as_str()).unwrap();

    let state = common::wait_for_terminal_state(&registry, job_id.as_str(), 60).await;
    assert_eq!(state, "Interrupted");
    mock.assert_async().await;
}

#[tokio::test]
async fn stopping_an_already_finished_job_is_a_conflict() {
    let (registry, _dir) = common::registry();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><body>no links</body></html>")
        .create_async()
        .await;

    let origin = format!("{}/", server.url());
    let config = JobConfig::builder(origin).hit_rate(100.0).build().unwrap();
    let job_id = registry.create(config).await.unwrap();

    let state = common::wait_for_terminal_state(&registry, job_id.as_str(), 60).await;
    assert_eq!(state, "Finished");

    let err = registry.stop(job_id.as_str()).unwrap_err();
    assert!(matches!(err, crawlidx::Error::Conflict(_)));
}

#[tokio::test]
async fn list_reports_created_jobs_newest_first() {
    let (registry, _dir) = common::registry();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><body>text</body></html>")
        .create_async()
        .await;
    let origin = format!("{}/", server.url());

    let first = registry
        .create(JobConfig::builder(origin.clone()).hit_rate(0.1).build().unwrap())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = registry
        .create(JobConfig::builder(origin).hit_rate(0.1).build().unwrap())
        .await
        .unwrap();

    let jobs = registry.list();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].job_id, second.as_str());
    assert_eq!(jobs[1].job_id, first.as_str());

    // Best-effort cleanup: either job may have already finished on its
    // own (no links to crawl), in which case stop() reports a conflict.
    let _ = registry.stop(first.as_str());
    let _ = registry.stop(second.as_str());
}

#[tokio::test]
async fn clear_all_stops_jobs_and_removes_files() {
    let (registry, _dir) = common::registry();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><body>clearable words here</body></html>")
        .create_async()
        .await;
    let origin = format!("{}/", server.url());

    let job_id = registry
        .create(JobConfig::builder(origin).hit_rate(100.0).build().unwrap())
        .await
        .unwrap();
    common::wait_for_terminal_state(&registry, job_id.as_str(), 60).await;

    let cleared = registry.clear_all().await.unwrap();
    assert!(cleared.visited_log_removed);
    assert!(cleared.crawler_files_removed > 0);
    assert!(cleared.storage_files_removed > 0);

    let stats = registry.statistics().await.unwrap();
    assert_eq!(stats.total_urls_visited, 0);
    assert_eq!(stats.total_indexed_words, 0);
}
