// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (stderr, filtered by RUST_LOG, default "info")
// 2. Parse command-line arguments using clap
// 3. Open the page archive (or run without one)
// 4. Run the crawl and print the final report
// 5. Exit with proper code (0 = crawl finished, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod archive; // src/archive/ - page summary persistence
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the crawl engine
mod extract; // src/extract/ - fetching and parsing pages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::{CrawlReport, Crawler, Sample, StatsSeries};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so the report on stdout stays clean
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.crawl_config();

    if cli.database_url.is_none() {
        tracing::warn!("ARCHIVE_DATABASE_URL is not set, no access to the web archive");
    }
    let archive = archive::open_archive(cli.database_url.as_deref())?;
    let launcher = crawl::launcher_for(cli.max_in_flight);

    tracing::info!(seed = %config.seed, ceiling = config.ceiling, "starting crawl");
    let crawler = Crawler::new(config, archive, launcher)?;
    let report = crawler.run().await?;

    print_report(&report, cli.json)?;
    Ok(())
}

// Prints the report either as text or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}

fn render_text(report: &CrawlReport) -> String {
    let mut out = String::new();
    out.push_str("\n------------------CRAWLER STATS------------------\n");
    out.push_str(&format!("Total queued: {}\n", report.total_queued));
    out.push_str(&format!("To be crawled (Queue) size: {}\n", report.frontier_size));
    out.push_str(&format!("Crawled size: {}\n", report.visited_size));
    out.push_str(&format!("Archived pages: {}\n", report.archived));
    out.push_str(&render_series(&report.stats));
    out
}

fn render_series(stats: &StatsSeries) -> String {
    format!(
        "Pages crawled per minute:\n{}\nCrawl to Queued Ratio per minute:\n{}\n",
        format_series(&stats.visited, 0),
        format_series(&stats.visited_to_frontier_ratio, 6)
    )
}

// One "elapsed value" pair per line
fn format_series(samples: &[Sample], value_precision: usize) -> String {
    samples
        .iter()
        .map(|s| format!("{:.6} {:.*}\n", s.elapsed_minutes, value_precision, s.value))
        .collect()
}
