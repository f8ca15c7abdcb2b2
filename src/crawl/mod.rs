// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - One concurrent task per discovered URL, with an optional cap on how many
//   fetches run at the same time
// - A shared visited registry so no URL is crawled twice
// - Configurable depth limit and internal-only mode
// - A global deadline that cancels every task still running
//
// Submodules:
// - visited: The set of URLs that already have a task
// - fetch: The Fetcher trait and its HTTP implementation
// - coordinator: Spawns tasks and collects their results
// =============================================================================

mod coordinator;
mod fetch;
mod visited;

pub use coordinator::{CrawlReport, CrawlResult, Crawler, FailedPage};
pub use fetch::{Fetcher, HttpFetcher, Page};
pub use visited::VisitedRegistry;
