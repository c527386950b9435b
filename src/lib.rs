//! `crawlidx`: a bounded-BFS web crawler with a partitioned inverted
//! index and a ranked search engine over it.
//!
//! The crate is organized around the four components this system
//! splits into: a [`crawl_job`] that runs one bounded BFS crawl from an
//! origin URL, a [`job_registry`] that owns the set of live and
//! checkpointed jobs, an [`index_store`] that appends and re-sorts the
//! per-letter word partitions those jobs write into, and a [`search`]
//! engine that ranks matches across those partitions.

pub mod config;
pub mod crawl_job;
pub mod error;
pub mod html_extractor;
pub mod index_store;
pub mod job_registry;
pub mod paths;
pub mod search;
pub mod visited_log;

pub use config::{JobConfig, JobConfigBuilder};
pub use crawl_job::{JobId, JobState};
pub use error::{Error, Result};
pub use job_registry::{ClearedCounts, JobRegistry, JobStatusView, JobSummary, Statistics, VisitedUrlsStats};
pub use paths::DataPaths;
pub use search::{SearchResponse, SearchResult, SortBy};
