// src/crawl/pipeline.rs
// =============================================================================
// The fetch + extract pipeline: the unit of work run for every URL.
//
// Steps:
// 1. Fetch the page (empty body = nothing to do, silently skipped)
// 2. Parse title, body text and links
// 3. Enqueue every link that is not in the visited set yet
// 4. Archive a PageSummary while the visited set is below the archive cap
//
// Many pipelines run at once. They share the frontier, the visited set and the
// archive, and none of them returns anything to the driver.
//
// Step 3 is where the visited-set race lives: contains() and the later add()
// by the driver are separate locked calls, so two pipelines can both enqueue
// the same new URL.
// =============================================================================

use std::sync::Arc;

use crate::archive::{ArchiveSink, CappedArchive, PageSummary};
use crate::extract::{parse_page, ExtractLimits, Fetcher};

use super::frontier::Frontier;
use super::visited::VisitedSet;

/// Handles shared by the driver and every pipeline task.
#[derive(Clone)]
pub struct CrawlContext {
    pub frontier: Arc<Frontier>,
    pub visited: Arc<VisitedSet>,
    pub archive: Arc<CappedArchive>,
    pub fetcher: Fetcher,
    pub limits: ExtractLimits,
}

// Fetches a URL and runs the rest of the pipeline on the result
pub async fn fetch_and_process(ctx: &CrawlContext, url: &str) {
    let content = ctx.fetcher.fetch(url).await;
    process_page(ctx, url, &content).await;
}

// Extracts a fetched page, feeds new links to the frontier and archives it
pub async fn process_page(ctx: &CrawlContext, url: &str, content: &[u8]) {
    if content.is_empty() {
        tracing::debug!(url, "empty content, nothing to extract");
        return;
    }

    // Parsing is synchronous; the parsed DOM is dropped before any .await
    let page = parse_page(content, ctx.limits);

    if !page.title.is_empty() {
        tracing::info!(count = ctx.visited.size(), url, title = %page.title, "crawled");
    }

    let mut discovered = 0;
    for link in page.links {
        if !ctx.visited.contains(&link) {
            ctx.frontier.enqueue(link);
            discovered += 1;
        }
    }
    tracing::debug!(url, discovered, "links enqueued");

    if ctx.visited.size() < ctx.archive.cap() {
        let summary = PageSummary {
            url: url.to_string(),
            title: page.title,
            content: page.content,
        };
        if let Err(e) = ctx.archive.insert(&summary).await {
            tracing::warn!(url, error = %e, "failed to archive page");
        }
    }
}
