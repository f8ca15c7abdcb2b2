// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Almost every error here is non-fatal: a failed page or image is reported
// and the crawl keeps going. Only configuration errors (bad seed URL, zero
// depth, ...) stop a run before it starts.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// Network or transport failure while fetching a page or image
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx status
    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Creating or writing a local image file failed
    #[error("file error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No usable file name could be derived from an image URL
    #[error("cannot derive a file name from {url}")]
    FileName { url: String },

    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl CrawlError {
    /// The URL this error is about, if it concerns a single resource
    pub fn url(&self) -> Option<&str> {
        match self {
            CrawlError::Fetch { url, .. }
            | CrawlError::Status { url, .. }
            | CrawlError::FileName { url }
            | CrawlError::InvalidSeed { url, .. } => Some(url),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
