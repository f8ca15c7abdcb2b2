// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Everything a run needs to know lives in CrawlConfig: where to start, how
// deep to go, how long to wait, where images go and whether links to other
// hosts are followed. The CLI builds one of these (see cli.rs); tests build
// them directly with struct update syntax on top of Default.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::{CrawlError, Result};

/// Starting page used when no seed URL is given
pub const DEFAULT_SEED_URL: &str = "https://rarehistoricalphotos.com";

/// How image URLs found during a crawl are turned into files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStrategy {
    /// Collect image URLs from every page, download them after the crawl
    #[default]
    Batch,
    /// Each crawl task downloads the images of its own page right away
    Inline,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed_url: String,
    /// 1 = only the seed page, 2 = seed + the pages it links to, ...
    pub max_depth: usize,
    /// Global deadline for the collection loop
    pub timeout: Duration,
    pub output_dir: PathBuf,
    /// Follow links that point to another host
    pub follow_external: bool,
    /// Maximum number of simultaneous page fetches (None = unbounded)
    pub max_concurrency: Option<usize>,
    pub image_strategy: ImageStrategy,
    /// Maximum number of simultaneous image downloads, shared by all
    /// crawl tasks when images are downloaded inline
    pub download_concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            max_depth: 3,
            timeout: Duration::from_secs(20),
            output_dir: PathBuf::from("images"),
            follow_external: true,
            max_concurrency: Some(64),
            image_strategy: ImageStrategy::Batch,
            download_concurrency: 8,
        }
    }
}

impl CrawlConfig {
    /// Checks the configuration before a crawl starts.
    ///
    /// These are the only errors that abort a run.
    pub fn validate(&self) -> Result<()> {
        let seed = Url::parse(&self.seed_url).map_err(|e| CrawlError::InvalidSeed {
            url: self.seed_url.clone(),
            reason: e.to_string(),
        })?;

        if seed.scheme() != "http" && seed.scheme() != "https" {
            return Err(CrawlError::InvalidSeed {
                url: self.seed_url.clone(),
                reason: format!("unsupported scheme '{}'", seed.scheme()),
            });
        }

        if seed.host_str().is_none() {
            return Err(CrawlError::InvalidSeed {
                url: self.seed_url.clone(),
                reason: "missing host".to_string(),
            });
        }

        if self.max_depth == 0 {
            return Err(CrawlError::Config("max_depth must be at least 1".to_string()));
        }

        if self.timeout.is_zero() {
            return Err(CrawlError::Config("timeout must be greater than zero".to_string()));
        }

        if self.max_concurrency == Some(0) {
            return Err(CrawlError::Config(
                "max_concurrency must be at least 1 (use None for unbounded)".to_string(),
            ));
        }

        if self.download_concurrency == 0 {
            return Err(CrawlError::Config(
                "download_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.follow_external);
        assert_eq!(config.image_strategy, ImageStrategy::Batch);
    }

    #[test]
    fn test_rejects_unparseable_seed() {
        let config = CrawlConfig {
            seed_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::InvalidSeed { .. })));
    }

    #[test]
    fn test_rejects_non_http_seed() {
        let config = CrawlConfig {
            seed_url: "ftp://example.com/files".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::InvalidSeed { .. })));
    }

    #[test]
    fn test_rejects_zero_depth_and_zero_limits() {
        let zero_depth = CrawlConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(zero_depth.validate(), Err(CrawlError::Config(_))));

        let zero_permits = CrawlConfig {
            max_concurrency: Some(0),
            ..Default::default()
        };
        assert!(matches!(zero_permits.validate(), Err(CrawlError::Config(_))));

        let unbounded = CrawlConfig {
            max_concurrency: None,
            ..Default::default()
        };
        assert!(unbounded.validate().is_ok());
    }
}
