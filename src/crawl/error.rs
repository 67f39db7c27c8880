// src/crawl/error.rs
// =============================================================================
// Errors raised by the crawl engine itself.
//
// Most failures in this crawler are recovered where they happen:
// - transport failures become empty content
// - missing titles or bodies become empty strings
// - an unavailable archive turns every insert into a no-op
//
// What is left here are contract violations the driver cannot recover from.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// dequeue() was called while the frontier held no URLs. The driver only
    /// dequeues after checking size() > 0, so seeing this is a bug.
    #[error("dequeue called on an empty frontier")]
    EmptyFrontier,

    /// The seed could not be parsed as an absolute http(s) URL.
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
}
