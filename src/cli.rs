// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl setting has a flag with the default the crawler was designed
// around. The archive connection string can also come from the
// ARCHIVE_DATABASE_URL environment variable; when neither is given the crawl
// runs without persistence.
// =============================================================================

use clap::Parser;
use std::time::Duration;

use crate::crawl::CrawlConfig;
use crate::extract::ExtractLimits;

#[derive(Parser, Debug)]
#[command(
    name = "crawl-archiver",
    version,
    about = "A breadth-first web crawler that archives page summaries",
    long_about = "crawl-archiver starts from a seed URL, follows absolute http(s) links breadth-first, \
                  stores a short summary of every page it parses and reports crawl throughput over time."
)]
pub struct Cli {
    /// URL to start crawling from
    #[arg(default_value = "https://www.manipal.edu/")]
    pub seed: String,

    /// Stop once this many URLs have been visited
    #[arg(long, default_value_t = 5000)]
    pub ceiling: usize,

    /// Maximum number of page summaries written to the archive
    #[arg(long, default_value_t = 1000)]
    pub archive_cap: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub fetch_timeout_secs: u64,

    /// Delay in milliseconds after each page handed to a pipeline task
    #[arg(long, default_value_t = 100)]
    pub pacing_ms: u64,

    /// Seconds between throughput samples
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub sample_interval_secs: u64,

    /// How many <a> elements are considered per page
    #[arg(long, default_value_t = 500)]
    pub max_links: usize,

    /// How many characters of body text are archived per page
    #[arg(long, default_value_t = 500)]
    pub content_chars: usize,

    /// Run at most this many pipeline tasks at once (default: no limit)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// PostgreSQL connection string for the page archive
    #[arg(long, env = "ARCHIVE_DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            seed: self.seed.clone(),
            ceiling: self.ceiling,
            archive_cap: self.archive_cap,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            pacing: Duration::from_millis(self.pacing_ms),
            sample_interval: Duration::from_secs(self.sample_interval_secs),
            limits: ExtractLimits {
                max_links: self.max_links,
                content_chars: self.content_chars,
            },
        }
    }
}
