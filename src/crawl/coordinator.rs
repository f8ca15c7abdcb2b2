// src/crawl/coordinator.rs
// =============================================================================
// This module runs a crawl: one task per discovered URL, all running at once,
// and a single collection loop that knows when they are all done.
//
// How it works:
// 1. The seed URL is claimed and a task is spawned for it
// 2. A task fetches its page, claims every new link it is allowed to follow,
//    spawns a child task per claimed link and then reports one result saying
//    how many children it spawned (or one error if the fetch failed)
// 3. The collection loop starts out expecting 1 report. Every result raises
//    that number by its child count, so the loop stops exactly when every
//    task that was ever spawned has reported
// 4. A deadline cuts the loop short. It also cancels the token every task
//    holds, so in-flight fetches are dropped instead of running on forever
// 5. After the loop we wait for the task tracker to drain, then download
//    the images (unless tasks already did that themselves)
//
// Invariants:
// - A task exists for a URL if and only if the parent's claim succeeded
// - A task spawned with depth 1 never spawns children
// - Channels are unbounded, so a task never blocks on its final send even if
//   the collector has already given up
// =============================================================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::fetch::{Fetcher, HttpFetcher};
use super::visited::VisitedRegistry;
use crate::config::{CrawlConfig, ImageStrategy};
use crate::download::{DownloadSummary, ImageDownloader};
use crate::error::{CrawlError, Result};
use crate::extract::{extract_images, is_internal_link};

/// How long we keep waiting for cancelled tasks after a timeout
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// What a successfully fetched page reports back to the collector
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub url: String,
    pub body: String,
    /// How many child tasks this page spawned, i.e. how many more reports
    /// the collector has to wait for
    pub spawned: usize,
}

/// A page that could not be fetched
#[derive(Debug, Clone, Serialize)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
}

/// Everything a crawl produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Crawled pages, in the order their results arrived
    pub pages: Vec<String>,
    pub failures: Vec<FailedPage>,
    /// Image URLs from every crawled page (duplicates kept)
    pub image_urls: Vec<String>,
    /// Number of reports the collector expected in the end
    pub to_collect: usize,
    /// Number of reports it actually received
    pub collected: usize,
    /// Number of URLs claimed during the run
    pub claimed: usize,
    pub timed_out: bool,
    pub downloads: DownloadSummary,
}

// State shared by every crawl task of one run
struct TaskContext {
    fetcher: Arc<dyn Fetcher>,
    visited: Arc<VisitedRegistry>,
    results: mpsc::UnboundedSender<CrawlResult>,
    errors: mpsc::UnboundedSender<CrawlError>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    limiter: Option<Arc<Semaphore>>,
    follow_external: bool,
    // Set only for ImageStrategy::Inline
    inline_images: Option<InlineImages>,
}

struct InlineImages {
    downloader: ImageDownloader,
    directory: PathBuf,
    summary: Mutex<DownloadSummary>,
}

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    downloader: ImageDownloader,
}

impl Crawler {
    /// Builds a crawler around any fetch implementation.
    ///
    /// `client` is only used for image downloads.
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>, client: Client) -> Result<Self> {
        config.validate()?;
        let downloader = ImageDownloader::new(client, config.download_concurrency);
        Ok(Self {
            config,
            fetcher,
            downloader,
        })
    }

    /// Builds a crawler that fetches pages and images over HTTP, sharing
    /// one connection pool.
    pub fn with_http(config: CrawlConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        let client = fetcher.client().clone();
        Self::new(config, Arc::new(fetcher), client)
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Runs the whole crawl and returns what it found.
    ///
    /// Page and image failures end up in the report, they never make this
    /// fail. A timeout sets `timed_out` and returns what was collected so far.
    pub async fn run(&self) -> CrawlReport {
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let (errors_tx, mut errors_rx) = mpsc::unbounded_channel();
        let visited = Arc::new(VisitedRegistry::new());
        let tracker = TaskTracker::new();
        let cancel = CancellationToken::new();

        let inline_images = match self.config.image_strategy {
            ImageStrategy::Inline => Some(InlineImages {
                downloader: self.downloader.clone(),
                directory: self.config.output_dir.clone(),
                summary: Mutex::new(DownloadSummary::default()),
            }),
            ImageStrategy::Batch => None,
        };

        let ctx = Arc::new(TaskContext {
            fetcher: self.fetcher.clone(),
            visited: visited.clone(),
            results: results_tx,
            errors: errors_tx,
            cancel: cancel.clone(),
            tracker: tracker.clone(),
            limiter: self
                .config
                .max_concurrency
                .map(|permits| Arc::new(Semaphore::new(permits))),
            follow_external: self.config.follow_external,
            inline_images,
        });

        let seed = self.config.seed_url.clone();
        visited.claim_if_new(&seed);
        spawn_task(&ctx, seed, self.config.max_depth);

        let mut report = CrawlReport {
            to_collect: 1,
            ..Default::default()
        };

        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        while report.collected < report.to_collect {
            tokio::select! {
                Some(result) = results_rx.recv() => {
                    report.collected += 1;
                    report.to_collect += result.spawned;
                    info!("found: {}", result.url);
                    report.image_urls.extend(extract_images(&result.body, &result.url));
                    report.pages.push(result.url);
                }
                Some(error) = errors_rx.recv() => {
                    report.collected += 1;
                    warn!("{}", error);
                    report.failures.push(FailedPage {
                        url: error.url().unwrap_or_default().to_string(),
                        error: error.to_string(),
                    });
                }
                _ = &mut deadline => {
                    warn!(
                        "crawling timed out: {}, {} of {} reports collected",
                        CrawlError::DeadlineExceeded(self.config.timeout),
                        report.collected,
                        report.to_collect
                    );
                    report.timed_out = true;
                    break;
                }
            }
        }

        // Anything still sending after this point goes nowhere
        drop(results_rx);
        drop(errors_rx);

        tracker.close();
        if report.timed_out {
            cancel.cancel();
            if tokio::time::timeout(SHUTDOWN_GRACE, tracker.wait()).await.is_err() {
                warn!(
                    "{} crawl task(s) still running after cancellation",
                    tracker.len()
                );
            }
        } else {
            tracker.wait().await;
        }

        report.claimed = visited.len();
        report.downloads = match &ctx.inline_images {
            Some(inline) => take_summary(&inline.summary),
            None => {
                self.downloader
                    .download_all(&report.image_urls, &self.config.output_dir)
                    .await
            }
        };

        info!(
            "crawl finished: {} page(s), {} error(s), {} image(s) saved",
            report.pages.len(),
            report.failures.len(),
            report.downloads.saved.len()
        );

        report
    }
}

// Spawns a task for a URL the caller has already claimed
fn spawn_task(ctx: &Arc<TaskContext>, url: String, depth: usize) {
    ctx.tracker.spawn(crawl_task(ctx.clone(), url, depth));
}

// Boxed because it (indirectly) spawns itself
fn crawl_task(ctx: Arc<TaskContext>, url: String, depth: usize) -> BoxFuture<'static, ()> {
    async move {
        if ctx.cancel.is_cancelled() {
            debug!("crawl cancelled before fetching {}", url);
            return;
        }

        let fetched = {
            // Held for the fetch only, children wait for their own permit
            let _permit = match &ctx.limiter {
                Some(limiter) => tokio::select! {
                    _ = ctx.cancel.cancelled() => return,
                    permit = limiter.clone().acquire_owned() => permit.ok(),
                },
                None => None,
            };

            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => {
                    debug!("crawl cancelled while fetching {}", url);
                    return;
                }
                fetched = ctx.fetcher.fetch(&url) => fetched,
            }
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                if ctx.errors.send(e).is_err() {
                    debug!("collector gone, dropping error for {}", url);
                }
                return;
            }
        };

        if ctx.cancel.is_cancelled() {
            return;
        }

        let mut spawned = 0;
        if depth > 1 {
            for link in &page.links {
                if !ctx.follow_external && !is_internal_link(&url, link) {
                    debug!("not following external link {}", link);
                    continue;
                }
                if ctx.visited.claim_if_new(link) {
                    spawn_task(&ctx, link.clone(), depth - 1);
                    spawned += 1;
                }
            }
        }

        let images = ctx
            .inline_images
            .as_ref()
            .map(|_| extract_images(&page.body, &url));

        let result = CrawlResult {
            url: url.clone(),
            body: page.body,
            spawned,
        };
        if ctx.results.send(result).is_err() {
            debug!("collector gone, dropping result for {}", url);
            return;
        }

        if let (Some(inline), Some(images)) = (&ctx.inline_images, images) {
            let summary = tokio::select! {
                _ = ctx.cancel.cancelled() => return,
                summary = inline.downloader.download_all(&images, &inline.directory) => summary,
            };
            merge_summary(&inline.summary, summary);
        }
    }
    .boxed()
}

fn merge_summary(shared: &Mutex<DownloadSummary>, summary: DownloadSummary) {
    match shared.lock() {
        Ok(mut guard) => guard.merge(summary),
        Err(poisoned) => poisoned.into_inner().merge(summary),
    }
}

fn take_summary(shared: &Mutex<DownloadSummary>) -> DownloadSummary {
    match shared.lock() {
        Ok(mut guard) => std::mem::take(&mut *guard),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
}
