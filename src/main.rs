//! Minimal CLI front end over [`crawlidx::JobRegistry`].
//!
//! `crawlidx crawl <url> [max_depth]` starts a job and waits for it to
//! finish; `crawlidx search <query>` searches the index built up under
//! `./data`.

use crawlidx::{JobConfig, JobRegistry, SortBy};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_default();

    let registry = JobRegistry::new("data");

    match command.as_str() {
        "crawl" => {
            let Some(url) = args.next() else {
                eprintln!("usage: crawlidx crawl <url> [max_depth]");
                std::process::exit(2);
            };
            let max_depth: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

            let config = JobConfig::builder(url).max_depth(max_depth).build()?;
            let job_id = registry.create(config).await?;
            println!("started job {job_id}");

            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let status = registry.status(job_id.as_str()).await?;
                println!("{}: {} urls visited, state={}", job_id, status.urls_visited, status.state);
                if status.state == "Finished" || status.state == "Stopped" {
                    break;
                }
            }
        }
        "search" => {
            let query: String = args.collect::<Vec<_>>().join(" ");
            if query.is_empty() {
                eprintln!("usage: crawlidx search <query>");
                std::process::exit(2);
            }
            let response = crawlidx::search::search(registry.paths(), &query, 20, 0, SortBy::Relevance).await?;
            println!(
                "{} result(s) across {} file(s) for {:?}",
                response.total_results, response.files_searched, response.query_words
            );
            for result in response.results {
                println!(
                    "  [{}] {} (word={}, freq={}, depth={})",
                    result.relevance_score, result.relevant_url, result.word, result.frequency, result.depth
                );
            }
        }
        other => {
            eprintln!("unknown command: {other:?}");
            eprintln!("usage: crawlidx <crawl|search> ...");
            std::process::exit(2);
        }
    }

    Ok(())
}
