// src/archive/sink.rs
// =============================================================================
// The archive sink is where page summaries end up.
//
// The crawler only ever talks to the ArchiveSink trait:
// - connect(): open a session and wipe whatever a previous run left behind
// - insert(): store one summary
// - disconnect(): close the session
//
// Implementations:
// - PostgresArchive (postgres.rs): the real store
// - DisabledArchive: used when no connection string is configured; every
//   operation succeeds and does nothing
// - CappedArchive: wraps another sink and stops accepting inserts after a
//   fixed number of them
// =============================================================================

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What we keep for each fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    /// At most the first 500 characters of visible body text
    pub content: String,
}

/// A store for page summaries. Must be safe to call from many tasks at once.
#[async_trait]
pub trait ArchiveSink: Send + Sync {
    /// Opens the store and clears any previous contents.
    async fn connect(&self) -> Result<()>;

    async fn insert(&self, summary: &PageSummary) -> Result<()>;

    async fn disconnect(&self);
}

/// The sink used when persistence is not configured.
#[derive(Debug, Default)]
pub struct DisabledArchive;

#[async_trait]
impl ArchiveSink for DisabledArchive {
    async fn connect(&self) -> Result<()> {
        tracing::info!("no archive configured, page summaries will not be persisted");
        Ok(())
    }

    async fn insert(&self, _summary: &PageSummary) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self) {}
}

/// Limits how many summaries reach the wrapped sink.
///
/// The pipeline already skips archiving once the visited set has grown past
/// the cap, but that check races with other pipeline tasks. The counter here
/// is the hard limit.
pub struct CappedArchive {
    inner: Arc<dyn ArchiveSink>,
    cap: usize,
    accepted: AtomicUsize,
}

impl CappedArchive {
    pub fn new(inner: Arc<dyn ArchiveSink>, cap: usize) -> Self {
        Self {
            inner,
            cap,
            accepted: AtomicUsize::new(0),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of summaries the wrapped sink has stored (or is storing) so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Acquire)
    }

    // Reserves one slot, or returns false when the cap is reached
    fn try_reserve(&self) -> bool {
        self.accepted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.cap).then_some(n + 1)
            })
            .is_ok()
    }
}

#[async_trait]
impl ArchiveSink for CappedArchive {
    async fn connect(&self) -> Result<()> {
        self.inner.connect().await
    }

    async fn insert(&self, summary: &PageSummary) -> Result<()> {
        if !self.try_reserve() {
            tracing::debug!(url = %summary.url, cap = self.cap, "archive cap reached, summary dropped");
            return Ok(());
        }
        let result = self.inner.insert(summary).await;
        if result.is_err() {
            // Nothing was stored, so the slot goes back to the pool
            self.accepted.fetch_sub(1, Ordering::AcqRel);
        }
        result
    }

    async fn disconnect(&self) {
        self.inner.disconnect().await
    }
}

/// In-memory sink for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryArchive {
    pub connected: std::sync::atomic::AtomicBool,
    pub summaries: std::sync::Mutex<Vec<PageSummary>>,
}

#[cfg(test)]
impl MemoryArchive {
    pub fn summaries(&self) -> Vec<PageSummary> {
        self.summaries.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ArchiveSink for MemoryArchive {
    async fn connect(&self) -> Result<()> {
        self.summaries.lock().unwrap().clear();
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn insert(&self, summary: &PageSummary) -> Result<()> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }
}
