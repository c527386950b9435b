//! Crawl job configuration and its validating builder.
//!
//! Modeled on the teacher's `config::CrawlConfigBuilder` (fluent
//! `with_x(mut self, ...) -> Self` methods, `#[must_use]`), trimmed to the
//! parameters this spec actually exposes and validated eagerly in
//! `build()` rather than left to panic downstream.

use crate::error::{Error, Result};

/// Crawl job parameters, validated at construction.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub(crate) origin_url: String,
    pub(crate) max_depth: u32,
    pub(crate) hit_rate: f64,
    pub(crate) max_queue_capacity: usize,
    pub(crate) max_urls_to_visit: usize,
}

impl JobConfig {
    #[must_use]
    pub fn builder(origin_url: impl Into<String>) -> JobConfigBuilder {
        JobConfigBuilder::new(origin_url)
    }

    #[must_use]
    pub fn origin_url(&self) -> &str {
        &self.origin_url
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        self.hit_rate
    }

    #[must_use]
    pub fn max_queue_capacity(&self) -> usize {
        self.max_queue_capacity
    }

    /// `0` means unlimited (spec.md §6).
    #[must_use]
    pub fn max_urls_to_visit(&self) -> usize {
        self.max_urls_to_visit
    }
}

/// Fluent, validating builder for [`JobConfig`].
pub struct JobConfigBuilder {
    origin_url: String,
    max_depth: u32,
    hit_rate: f64,
    max_queue_capacity: usize,
    max_urls_to_visit: usize,
}

impl JobConfigBuilder {
    #[must_use]
    pub fn new(origin_url: impl Into<String>) -> Self {
        Self {
            origin_url: origin_url.into(),
            max_depth: 3,
            hit_rate: 2.0,
            max_queue_capacity: 10_000,
            max_urls_to_visit: 0,
        }
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn hit_rate(mut self, hit_rate: f64) -> Self {
        self.hit_rate = hit_rate;
        self
    }

    #[must_use]
    pub fn max_queue_capacity(mut self, capacity: usize) -> Self {
        self.max_queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn max_urls_to_visit(mut self, max: usize) -> Self {
        self.max_urls_to_visit = max;
        self
    }

    /// Validates every field against spec.md §6's domains, returning
    /// [`Error::InvalidInput`] instead of panicking on the first bad value.
    pub fn build(self) -> Result<JobConfig> {
        if url::Url::parse(&self.origin_url).is_err() {
            return Err(Error::InvalidInput(format!(
                "origin_url is not a valid URL: {}",
                self.origin_url
            )));
        }
        if !(1..=1000).contains(&self.max_depth) {
            return Err(Error::InvalidInput(format!(
                "max_depth must be between 1 and 1000, got {}",
                self.max_depth
            )));
        }
        if !(0.1..=1000.0).contains(&self.hit_rate) {
            return Err(Error::InvalidInput(format!(
                "hit_rate must be between 0.1 and 1000.0, got {}",
                self.hit_rate
            )));
        }
        if !(100..=100_000).contains(&self.max_queue_capacity) {
            return Err(Error::InvalidInput(format!(
                "max_queue_capacity must be between 100 and 100000, got {}",
                self.max_queue_capacity
            )));
        }
        if self.max_urls_to_visit > 10_000 {
            return Err(Error::InvalidInput(format!(
                "max_urls_to_visit must be between 0 and 10000, got {}",
                self.max_urls_to_visit
            )));
        }

        Ok(JobConfig {
            origin_url: self.origin_url,
            max_depth: self.max_depth,
            hit_rate: self.hit_rate,
            max_queue_capacity: self.max_queue_capacity,
            max_urls_to_visit: self.max_urls_to_visit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let config = JobConfig::builder("https://example.com").build().unwrap();
        assert_eq!(config.max_depth(), 3);
        assert!((config.hit_rate() - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.max_urls_to_visit(), 0);
    }

    #[test]
    fn rejects_out_of_range_max_depth() {
        let err = JobConfig::builder("https://example.com")
            .max_depth(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_out_of_range_hit_rate() {
        let err = JobConfig::builder("https://example.com")
            .hit_rate(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_invalid_origin_url() {
        let err = JobConfig::builder("not a url").build().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_queue_capacity_out_of_range() {
        let err = JobConfig::builder("https://example.com")
            .max_queue_capacity(10)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_max_urls_to_visit_too_large() {
        let err = JobConfig::builder("https://example.com")
            .max_urls_to_visit(20_000)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
