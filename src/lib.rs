// src/lib.rs
// =============================================================================
// image-crawler: a bounded-depth concurrent web crawler that downloads the
// images it finds.
//
// Start at a seed URL, follow links up to a depth limit (optionally leaving
// the seed's host), and save every <img> it encounters to a directory.
//
// Quick start:
//
//     let config = CrawlConfig {
//         seed_url: "https://example.com".to_string(),
//         max_depth: 2,
//         ..Default::default()
//     };
//     let report = Crawler::with_http(config)?.run().await;
//     println!("{} pages, {} images", report.pages.len(), report.image_urls.len());
// =============================================================================

pub mod config;
pub mod crawl;
pub mod download;
pub mod error;
pub mod extract;

pub use config::{CrawlConfig, ImageStrategy};
pub use crawl::{CrawlReport, Crawler, Fetcher, HttpFetcher, Page, VisitedRegistry};
pub use download::{DownloadSummary, ImageDownloader};
pub use error::{CrawlError, Result};
