//! Resume-from-files: stopping a job and restarting it from its
//! on-disk checkpoint picks the crawl back up rather than starting
//! over, per spec.md §8.

mod common;

use crawlidx::{search, Error, JobConfig, SortBy};
use std::time::Duration;

#[tokio::test]
async fn resume_from_files_continues_a_stopped_job() {
    let (registry, _dir) = common::registry();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"<html><body><p>origin</p><a href="/a">a</a><a href="/b">b</a></body></html>"#)
        .create_async()
        .await;
    server
        .mock("GET", "/a")
        .with_status(200)
        .with_body("<html><body><p>alpha</p></body></html>")
        .create_async()
        .await;
    server
        .mock("GET", "/b")
        .with_status(200)
        .with_body("<html><body><p>beta</p></body></html>")
        .create_async()
        .await;

    let origin = format!("{}/", server.url());
    // The first fetch never waits (no prior request to measure against),
    // but hit_rate=1.0 forces a full ~1s gap before the second one, giving
    // a reliable window to observe the job mid-crawl and stop it with
    // part of the frontier still queued.
    let config = JobConfig::builder(origin.clone())
        .max_depth(2)
        .hit_rate(1.0)
        .build()
        .unwrap();
    let job_id = registry.create(config).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    let status = registry.status(job_id.as_str()).await.unwrap();
    assert_eq!(status.urls_visited, 1, "only the origin should have been fetched yet");
    assert!(!status.queue_preview.is_empty(), "a and b should still be queued");

    registry.stop(job_id.as_str()).unwrap();
    let state = common::wait_for_terminal_state(&registry, job_id.as_str(), 60).await;
    assert_eq!(state, "Interrupted");

    let status = registry.status(job_id.as_str()).await.unwrap();
    assert!(
        status.urls_visited < 3,
        "the stop should have landed before the whole frontier was drained"
    );

    registry.resume_from_files(job_id.as_str()).await.unwrap();
    let state = common::wait_for_terminal_state(&registry, job_id.as_str(), 100).await;
    assert_eq!(state, "Finished");

    let status = registry.status(job_id.as_str()).await.unwrap();
    assert_eq!(status.urls_visited, 3);

    let response = search::search(registry.paths(), "alpha beta", 10, 0, SortBy::Relevance)
        .await
        .unwrap();
    assert_eq!(response.total_results, 2);
}

#[tokio::test]
async fn resuming_a_live_job_is_a_conflict() {
    let (registry, _dir) = common::registry();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><body>text</body></html>")
        .create_async()
        .await;
    let origin = format!("{}/", server.url());
    let job_id = registry
        .create(JobConfig::builder(origin).hit_rate(0.1).build().unwrap())
        .await
        .unwrap();

    let err = registry.resume_from_files(job_id.as_str()).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let _ = registry.stop(job_id.as_str());
}

#[tokio::test]
async fn resuming_an_unknown_job_is_not_found() {
    let (registry, _dir) = common::registry();
    let err = registry.resume_from_files("no-such-job").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
