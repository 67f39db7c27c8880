// src/crawl/driver.rs
// =============================================================================
// The crawl driver: the single thread of control that owns the frontier.
//
// States:
//   Seeding -> Running -> Draining -> Terminated
//
// - Seeding: enqueue the seed, dequeue it, mark it visited and run the whole
//   pipeline on it before anything runs concurrently
// - Running: while the frontier is not empty and the visited count is below
//   the ceiling, dequeue the next URL, mark it visited and fetch it. A page
//   with content gets a pipeline task; an empty fetch is skipped. After each
//   launch the driver sleeps for the pacing delay.
// - Draining: stop the stats sampler (it hands back its series) and
//   disconnect the archive. Pipeline tasks still in flight are NOT awaited.
// - Terminated: build the final report
//
// The driver is the only caller of Frontier::dequeue(). That is what makes
// "check size(), then dequeue()" safe.
//
// Termination:
// - The visited count only grows and stops the loop at the ceiling
// - Otherwise the loop ends once the reachable pages are used up
// =============================================================================

use anyhow::{Context, Result};
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::archive::{ArchiveSink, CappedArchive};
use crate::extract::{ExtractLimits, Fetcher};

use super::error::CrawlError;
use super::frontier::Frontier;
use super::launcher::TaskLauncher;
use super::pipeline::{fetch_and_process, process_page, CrawlContext};
use super::stats::{StatsSampler, StatsSeries};
use super::visited::VisitedSet;

/// Everything that tunes a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: String,
    /// Stop once this many URLs have been visited
    pub ceiling: usize,
    /// Maximum number of summaries written to the archive
    pub archive_cap: usize,
    pub fetch_timeout: Duration,
    /// Delay after each launched pipeline task
    pub pacing: Duration,
    pub sample_interval: Duration,
    pub limits: ExtractLimits,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed: "https://www.manipal.edu/".to_string(),
            ceiling: 5000,
            archive_cap: 1000,
            fetch_timeout: Duration::from_secs(5),
            pacing: Duration::from_millis(100),
            sample_interval: Duration::from_secs(60),
            limits: ExtractLimits::default(),
        }
    }
}

/// Final counters and series of a crawl.
///
/// Pipeline tasks may still be running when this is built, so `frontier_size`
/// and `archived` can lag slightly behind what eventually happens.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub total_queued: usize,
    pub frontier_size: usize,
    pub visited_size: usize,
    pub archived: usize,
    pub stats: StatsSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlPhase {
    Seeding,
    Running,
    Draining,
    Terminated,
}

pub struct Crawler {
    config: CrawlConfig,
    ctx: CrawlContext,
    launcher: Arc<dyn TaskLauncher>,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        archive: Arc<dyn ArchiveSink>,
        launcher: Arc<dyn TaskLauncher>,
    ) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch_timeout)?;
        let ctx = CrawlContext {
            frontier: Arc::new(Frontier::new()),
            visited: Arc::new(VisitedSet::new()),
            archive: Arc::new(CappedArchive::new(archive, config.archive_cap)),
            fetcher,
            limits: config.limits,
        };

        Ok(Self {
            config,
            ctx,
            launcher,
        })
    }

    /// Runs the crawl to completion and returns the final report.
    pub async fn run(&self) -> Result<CrawlReport> {
        validate_seed(&self.config.seed)?;

        self.ctx
            .archive
            .connect()
            .await
            .context("failed to connect the page archive")?;

        let sampler = StatsSampler::spawn(
            Arc::clone(&self.ctx.visited),
            Arc::clone(&self.ctx.frontier),
            self.config.sample_interval,
        );

        // Drain even when the crawl loop hits a fatal error
        let outcome = self.crawl().await;

        log_phase(CrawlPhase::Draining);
        let stats = sampler.stop().await;
        self.ctx.archive.disconnect().await;
        outcome?;

        log_phase(CrawlPhase::Terminated);
        Ok(self.report(stats))
    }

    async fn crawl(&self) -> Result<(), CrawlError> {
        let frontier = &self.ctx.frontier;
        let visited = &self.ctx.visited;

        log_phase(CrawlPhase::Seeding);
        frontier.enqueue(self.config.seed.as_str());
        let seed = frontier.dequeue()?;
        visited.add(&seed);
        fetch_and_process(&self.ctx, &seed).await;

        log_phase(CrawlPhase::Running);
        while frontier.size() > 0 && visited.size() < self.config.ceiling {
            let url = frontier.dequeue()?;
            visited.add(&url);

            let content = self.ctx.fetcher.fetch(&url).await;
            if content.is_empty() {
                tracing::debug!(url = %url, "empty fetch, no pipeline launched");
                continue;
            }

            let ctx = self.ctx.clone();
            self.launcher
                .launch(
                    async move {
                        process_page(&ctx, &url, &content).await;
                    }
                    .boxed(),
                )
                .await;

            tokio::time::sleep(self.config.pacing).await;
        }

        Ok(())
    }

    fn report(&self, stats: StatsSeries) -> CrawlReport {
        CrawlReport {
            total_queued: self.ctx.frontier.total_queued(),
            frontier_size: self.ctx.frontier.size(),
            visited_size: self.ctx.visited.size(),
            archived: self.ctx.archive.accepted(),
            stats,
        }
    }
}

fn log_phase(phase: CrawlPhase) {
    tracing::info!(phase = ?phase, "crawl phase");
}

// The seed must be an absolute http(s) URL, the same rule applied to links
fn validate_seed(seed: &str) -> Result<(), CrawlError> {
    let parsed = Url::parse(seed).map_err(|e| CrawlError::InvalidSeed {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CrawlError::InvalidSeed {
            url: seed.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is process_page boxed?
//    - TaskLauncher takes a BoxFuture<'static, ()> so it can be a trait object
//    - .boxed() (from futures::FutureExt) pins the future on the heap
//    - 'static means the task owns everything it uses: a cloned context,
//      the URL and the fetched bytes
//
// 2. Why is the context cloned for every task?
//    - CrawlContext is just a handful of Arcs and a reqwest Client
//    - Cloning only bumps reference counts; everyone shares the same
//      frontier, visited set and archive
//
// 3. Why keep `outcome` and apply `?` later?
//    - The sampler and the archive must be shut down even if the loop failed
// -----------------------------------------------------------------------------
