// src/crawl/frontier.rs
// =============================================================================
// The frontier is the FIFO queue of URLs that have been discovered but not
// fetched yet.
//
// How it works:
// - enqueue() appends to the tail and bumps the lifetime counter
// - dequeue() pops the head, or fails with EmptyFrontier
// - size() is the number of URLs still waiting (not the lifetime count)
//
// Concurrency:
// - Every operation runs under one Mutex, so pipeline tasks can enqueue while
//   the driver dequeues without corrupting the order or the counters.
// - The queue never blocks waiting for work. The driver checks size() and only
//   then calls dequeue(). This is only safe because the driver is the single
//   caller of dequeue(). Parallelising the driver would need an atomic
//   "pop if non-empty" instead of size() followed by dequeue().
//
// Rust concepts:
// - VecDeque: O(1) push_back / pop_front
// - Mutex: interior mutability shared behind an Arc
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::CrawlError;

// Everything the lock protects lives in one struct
#[derive(Debug, Default)]
struct FrontierState {
    urls: VecDeque<String>,
    total_queued: usize,
}

/// Thread-safe FIFO of discovered-but-unfetched URLs.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the tail of the queue.
    ///
    /// Duplicates are not filtered here: every call counts towards
    /// `total_queued`, including the ones produced by the visited-set race.
    pub fn enqueue(&self, url: impl Into<String>) {
        let mut state = self.lock();
        state.urls.push_back(url.into());
        state.total_queued += 1;
    }

    /// Removes and returns the head of the queue.
    ///
    /// An empty queue leaves the state untouched and returns
    /// `CrawlError::EmptyFrontier`.
    pub fn dequeue(&self) -> Result<String, CrawlError> {
        self.lock().urls.pop_front().ok_or(CrawlError::EmptyFrontier)
    }

    /// Number of URLs still waiting to be fetched.
    pub fn size(&self) -> usize {
        self.lock().urls.len()
    }

    /// Number of enqueue calls over the lifetime of the crawl.
    pub fn total_queued(&self) -> usize {
        self.lock().total_queued
    }

    // A panic inside one of the short critical sections above cannot leave the
    // state half-written, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not tokio::sync::Mutex?
//    - None of the critical sections await anything
//    - std::sync::Mutex is cheaper and fine as long as the guard is dropped
//      before the next .await
//
// 2. What is impl Into<String>?
//    - Lets callers pass either &str or String
//    - A String is moved in, a &str is copied once
//
// 3. What is ok_or()?
//    - Turns Option<T> into Result<T, E>
//    - None becomes Err(CrawlError::EmptyFrontier)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new();
        frontier.enqueue("https://a.example");
        frontier.enqueue("https://b.example".to_string());
        frontier.enqueue("https://c.example");

        assert_eq!(frontier.dequeue().unwrap(), "https://a.example");
        assert_eq!(frontier.dequeue().unwrap(), "https://b.example");
        assert_eq!(frontier.dequeue().unwrap(), "https://c.example");
    }

    #[test]
    fn test_size_tracks_net_enqueues_and_total_tracks_all() {
        let frontier = Frontier::new();
        let mut enqueued = 0;
        let mut dequeued = 0;

        // e e d e d d e
        for step in ["e", "e", "d", "e", "d", "d", "e"] {
            if step == "e" {
                frontier.enqueue(format!("https://example.com/{}", enqueued));
                enqueued += 1;
            } else {
                frontier.dequeue().unwrap();
                dequeued += 1;
            }
            assert_eq!(frontier.size(), enqueued - dequeued);
            assert_eq!(frontier.total_queued(), enqueued);
        }
    }

    #[test]
    fn test_dequeue_empty_is_error_without_mutation() {
        let frontier = Frontier::new();
        assert!(matches!(frontier.dequeue(), Err(CrawlError::EmptyFrontier)));
        assert_eq!(frontier.size(), 0);
        assert_eq!(frontier.total_queued(), 0);

        frontier.enqueue("https://example.com");
        frontier.dequeue().unwrap();
        assert!(matches!(frontier.dequeue(), Err(CrawlError::EmptyFrontier)));
        assert_eq!(frontier.size(), 0);
        assert_eq!(frontier.total_queued(), 1);
    }

    #[test]
    fn test_duplicates_are_counted() {
        let frontier = Frontier::new();
        frontier.enqueue("https://example.com");
        frontier.enqueue("https://example.com");
        assert_eq!(frontier.size(), 2);
        assert_eq!(frontier.total_queued(), 2);
    }

    #[test]
    fn test_concurrent_enqueue_keeps_counts_consistent() {
        let frontier = Arc::new(Frontier::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let frontier = Arc::clone(&frontier);
                thread::spawn(move || {
                    for i in 0..250 {
                        frontier.enqueue(format!("https://example.com/{}/{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(frontier.size(), 2000);
        assert_eq!(frontier.total_queued(), 2000);

        let mut drained = 0;
        while frontier.size() > 0 {
            frontier.dequeue().unwrap();
            drained += 1;
        }
        assert_eq!(drained, 2000);
    }
}
