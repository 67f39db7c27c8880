// src/crawl/mod.rs
// =============================================================================
// This module is the concurrent crawl engine.
//
// Features:
// - Breadth-first crawling from a single seed URL
// - A shared FIFO frontier and a shared visited set, each behind its own lock
// - One pipeline task per fetched page, started through a TaskLauncher
// - A background sampler recording throughput over time
// - A visited-count ceiling and an archive insertion cap
//
// Submodules:
// - frontier: the FIFO work queue
// - visited: the fingerprint set used for dedup
// - pipeline: extract a page, enqueue its links, archive its summary
// - launcher: how pipeline tasks are spawned (unbounded or bounded)
// - stats: the periodic sampler
// - driver: the state machine tying everything together
// =============================================================================

mod driver;
mod error;
mod frontier;
mod launcher;
mod pipeline;
mod stats;
mod visited;

pub use driver::{CrawlConfig, CrawlReport, Crawler};
pub use launcher::launcher_for;
pub use stats::{Sample, StatsSeries};
