// src/download/images.rs
// =============================================================================
// Downloads images and writes each one to the output directory.
//
// How it works:
// 1. Derive a file name from the last path segment of the URL
// 2. GET the image
// 3. Write the bytes to <directory>/<file name>
//
// Failures never stop the batch: a bad URL, a 404 or a full disk only costs
// that single image. The body is read completely before the file is
// touched, so a broken download never clobbers an existing file. Two
// different URLs that end in the same file name overwrite each other,
// last one wins.
//
// Clones of an ImageDownloader share one download limit, so crawl tasks
// downloading their own images still respect it as a whole.
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use url::Url;

use crate::error::{CrawlError, Result};

/// What happened to a batch of image downloads
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    /// Files written, in completion order
    pub saved: Vec<PathBuf>,
    /// Images skipped because of an error
    pub failed: usize,
}

impl DownloadSummary {
    pub fn merge(&mut self, other: DownloadSummary) {
        self.saved.extend(other.saved);
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    concurrency: usize,
    // Shared by every clone
    limiter: Arc<Semaphore>,
}

impl ImageDownloader {
    pub fn new(client: Client, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            client,
            concurrency,
            limiter: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// Downloads every URL into `directory`, creating it if needed.
    ///
    /// Up to `concurrency` downloads run at once across this downloader and
    /// all of its clones; results come back in completion order, not input
    /// order.
    pub async fn download_all(&self, urls: &[String], directory: &Path) -> DownloadSummary {
        let mut summary = DownloadSummary::default();
        if urls.is_empty() {
            return summary;
        }

        if let Err(source) = tokio::fs::create_dir_all(directory).await {
            let err = CrawlError::Io {
                path: directory.to_path_buf(),
                source,
            };
            warn!("cannot prepare image directory: {}", err);
            summary.failed = urls.len();
            return summary;
        }

        let outcomes: Vec<(String, Result<PathBuf>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let outcome = self.download_one(&url, directory).await;
                (url, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (url, outcome) in outcomes {
            match outcome {
                Ok(path) => {
                    info!("saved image {} -> {}", url, path.display());
                    summary.saved.push(path);
                }
                Err(e) => {
                    warn!("skipping image {}: {}", url, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    async fn download_one(&self, url: &str, directory: &Path) -> Result<PathBuf> {
        let file_name = file_name_for(url).ok_or_else(|| CrawlError::FileName {
            url: url.to_string(),
        })?;

        // Never closed, so acquiring only waits for a free slot
        let _permit = self.limiter.acquire().await.ok();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| CrawlError::Fetch {
            url: url.to_string(),
            source,
        })?;

        let path = directory.join(file_name);
        let io_err = |source| CrawlError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::create(&path).await.map_err(io_err)?;
        file.write_all(&bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        Ok(path)
    }
}

/// Strips the query string from a file name.
///
/// "photo.jpg?size=large" -> "photo.jpg"
pub fn sanitize_file_name(name: &str) -> &str {
    name.split('?').next().unwrap_or(name)
}

/// Derives the local file name for an image URL: the last path segment,
/// without query string or fragment. Returns None for unparseable URLs and
/// URLs whose path ends in "/" (including no path at all).
pub fn file_name_for(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.last()?;

    match sanitize_file_name(segment) {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}
