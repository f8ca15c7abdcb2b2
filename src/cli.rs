// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl setting has a flag with a sensible default, so running the
// binary with no arguments crawls the default seed three levels deep.
// The parsed Cli is turned into a CrawlConfig, which the library validates.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use image_crawler::config::DEFAULT_SEED_URL;
use image_crawler::{CrawlConfig, ImageStrategy};

#[derive(Parser, Debug)]
#[command(
    name = "image-crawler",
    version = "0.1.0",
    about = "Crawl a website up to a fixed depth and download every image it links to",
    long_about = "image-crawler starts at a seed URL, follows links concurrently up to --max-depth \
                  levels and saves the images it finds into --output-dir. The whole crawl is \
                  bounded by --timeout-secs."
)]
pub struct Cli {
    /// Page to start crawling from
    #[arg(long, default_value = DEFAULT_SEED_URL)]
    pub seed_url: String,

    /// Maximum crawl depth
    ///
    /// Depth 1 = just the starting page
    /// Depth 2 = starting page + all pages it links to
    /// etc.
    #[arg(long, default_value_t = 3)]
    pub max_depth: usize,

    /// Give up collecting results after this many seconds
    #[arg(long, default_value_t = 20)]
    pub timeout_secs: u64,

    /// Directory the images are written to
    #[arg(long, default_value = "images")]
    pub output_dir: PathBuf,

    /// Whether to follow links that lead to other hosts
    ///
    /// Takes a value: --follow-external false
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub follow_external: bool,

    /// Maximum number of pages fetched at the same time (0 = no limit)
    #[arg(long, default_value_t = 64)]
    pub max_concurrency: usize,

    /// When images are downloaded
    #[arg(long, value_enum, default_value_t = ImagesArg::Batch)]
    pub images: ImagesArg,

    /// Maximum number of images downloaded at the same time
    #[arg(long, default_value_t = 8)]
    pub download_concurrency: usize,

    /// Print the crawl report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImagesArg {
    /// Download everything once the crawl is over
    Batch,
    /// Download each page's images as soon as the page is crawled
    Inline,
}

impl From<ImagesArg> for ImageStrategy {
    fn from(arg: ImagesArg) -> Self {
        match arg {
            ImagesArg::Batch => ImageStrategy::Batch,
            ImagesArg::Inline => ImageStrategy::Inline,
        }
    }
}

impl Cli {
    pub fn to_config(&self) -> CrawlConfig {
        CrawlConfig {
            seed_url: self.seed_url.clone(),
            max_depth: self.max_depth,
            timeout: Duration::from_secs(self.timeout_secs),
            output_dir: self.output_dir.clone(),
            follow_external: self.follow_external,
            max_concurrency: match self.max_concurrency {
                0 => None,
                n => Some(n),
            },
            image_strategy: self.images.into(),
            download_concurrency: self.download_concurrency,
        }
    }
}
