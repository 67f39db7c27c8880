// src/crawl/visited.rs
// =============================================================================
// The visited set records every URL that has been fetched (or is about to be).
//
// We don't store the URLs themselves. Each URL is reduced to a 256-bit SHA-256
// fingerprint and only the fingerprint is kept. Presence is all that matters;
// nothing is ever removed during a crawl.
//
// Known race (kept on purpose):
// - A pipeline task calls contains(href) and gets false
// - Before the driver dequeues href and calls add(href), another pipeline task
//   also sees false and enqueues href again
// - The URL is then dequeued and fetched twice. That costs a bit of work but
//   never breaks the crawl, and the frontier and this set stay separately
//   locked so neither can deadlock on the other.
// =============================================================================

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A fixed-width URL fingerprint.
pub type Fingerprint = [u8; 32];

/// Computes the fingerprint for a URL.
pub fn fingerprint(url: &str) -> Fingerprint {
    Sha256::digest(url.as_bytes()).into()
}

/// Thread-safe, grow-only set of URL fingerprints.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited. Returns true when the fingerprint is new.
    pub fn add(&self, url: &str) -> bool {
        let key = fingerprint(url);
        self.lock().insert(key)
    }

    pub fn contains(&self, url: &str) -> bool {
        let key = fingerprint(url);
        self.lock().contains(&key)
    }

    /// Number of distinct fingerprints recorded so far.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Fingerprint>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[rstest]
    #[case("https://example.com")]
    #[case("http://example.com/path?q=1")]
    #[case("")]
    fn test_add_then_contains(#[case] url: &str) {
        let visited = VisitedSet::new();
        assert!(!visited.contains(url));
        assert!(visited.add(url));
        assert!(visited.contains(url));
        assert_eq!(visited.size(), 1);
    }

    #[test]
    fn test_size_counts_distinct_fingerprints() {
        let visited = VisitedSet::new();
        visited.add("https://a.example");
        visited.add("https://b.example");
        assert_eq!(visited.size(), 2);

        // Adding the same URL again is not a new fingerprint
        assert!(!visited.add("https://a.example"));
        assert_eq!(visited.size(), 2);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinguishes_urls() {
        assert_eq!(fingerprint("https://a.example"), fingerprint("https://a.example"));
        assert_ne!(fingerprint("https://a.example"), fingerprint("https://a.example/"));
    }

    #[test]
    fn test_concurrent_adds() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let visited = Arc::clone(&visited);
                thread::spawn(move || {
                    for i in 0..500 {
                        visited.add(&format!("https://example.com/{}", i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every thread added the same 500 URLs
        assert_eq!(visited.size(), 500);
        assert!(visited.contains("https://example.com/499"));
    }
}
