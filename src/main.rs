// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (progress lines go to stderr, the report to stdout)
// 2. Parse command-line arguments using clap
// 3. Run the crawl
// 4. Print the report and exit with a proper code
//    (0 = finished, 1 = timed out, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use image_crawler::{CrawlReport, Crawler};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays parseable.
// RUST_LOG overrides the default level, e.g. RUST_LOG=image_crawler=debug
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("image_crawler=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = crawl finished (individual page errors included)
//   Ok(1) = crawl timed out
//   Err   = invalid configuration or setup failure
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = cli.to_config();

    let crawler = Crawler::with_http(config)
        .with_context(|| format!("cannot start crawl of {}", cli.seed_url))?;

    println!("🔍 Crawling: {}", crawler.config().seed_url);
    println!("📊 Max crawl depth: {}", crawler.config().max_depth);

    let report = crawler.run().await;

    if cli.json {
        let json_output = serde_json::to_string_pretty(&report)?;
        println!("{}", json_output);
    } else {
        print_summary(&report);
    }

    Ok(if report.timed_out { 1 } else { 0 })
}

// Prints a human-readable summary of the crawl
fn print_summary(report: &CrawlReport) {
    println!();

    if !report.failures.is_empty() {
        println!("{:<70} {:<30}", "FAILED URL", "ERROR");
        println!("{}", "=".repeat(100));
        for failure in &report.failures {
            // Truncate URL if too long for display
            let url_display = if failure.url.chars().count() > 67 {
                format!("{}...", failure.url.chars().take(67).collect::<String>())
            } else {
                failure.url.clone()
            };
            println!("{:<70} {}", url_display, failure.error);
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   📄 Pages crawled: {}", report.pages.len());
    println!("   ❌ Pages failed: {}", report.failures.len());
    println!("   🖼️  Images found: {}", report.image_urls.len());
    println!("   💾 Images saved: {}", report.downloads.saved.len());
    println!("   ⚠️  Images skipped: {}", report.downloads.failed);
    if report.timed_out {
        println!(
            "   ⏱️  Timed out after collecting {} of {} results",
            report.collected, report.to_collect
        );
    }
}
