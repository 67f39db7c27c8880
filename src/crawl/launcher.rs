// src/crawl/launcher.rs
// =============================================================================
// How pipeline tasks get started.
//
// The driver does not call tokio::spawn directly. It hands every pipeline
// future to a TaskLauncher, so the concurrency policy can change without
// touching the pipeline:
// - UnboundedLauncher: spawn immediately, no limit on tasks in flight
//   (the default)
// - BoundedLauncher: wait for one of N permits before spawning, so at most N
//   pipelines run at once. The driver is held back while all permits are
//   taken. This is opt-in with --max-in-flight.
//
// Launched tasks are fire-and-forget: nobody awaits them, and the crawl can
// finish while some are still running.
// =============================================================================

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[async_trait]
pub trait TaskLauncher: Send + Sync {
    /// Starts `task` in the background. Returns once it has been started.
    async fn launch(&self, task: BoxFuture<'static, ()>);
}

#[derive(Debug, Default)]
pub struct UnboundedLauncher;

#[async_trait]
impl TaskLauncher for UnboundedLauncher {
    async fn launch(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

#[derive(Debug)]
pub struct BoundedLauncher {
    permits: Arc<Semaphore>,
}

impl BoundedLauncher {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl TaskLauncher for BoundedLauncher {
    async fn launch(&self, task: BoxFuture<'static, ()>) {
        match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => {
                tokio::spawn(async move {
                    task.await;
                    drop(permit);
                });
            }
            // The semaphore is never closed, but if it were the task still runs
            Err(_) => {
                tokio::spawn(task);
            }
        }
    }
}

/// Builds the launcher for a run. `None` means unbounded.
pub fn launcher_for(max_in_flight: Option<usize>) -> Arc<dyn TaskLauncher> {
    match max_in_flight {
        Some(limit) => {
            let launcher = BoundedLauncher::new(limit);
            tracing::info!(max_in_flight = launcher.available(), "pipeline tasks are bounded");
            Arc::new(launcher)
        }
        None => Arc::new(UnboundedLauncher),
    }
}

/// Launcher for tests that keeps the join handles so a test can wait for
/// every pipeline task to finish before asserting.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TrackingLauncher {
    launched: std::sync::atomic::AtomicUsize,
    handles: std::sync::Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

#[cfg(test)]
impl TrackingLauncher {
    pub fn launched(&self) -> usize {
        self.launched.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub async fn join_all(&self) {
        let handles: Vec<_> = self.handles.lock().unwrap().drain(..).collect();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TaskLauncher for TrackingLauncher {
    async fn launch(&self, task: BoxFuture<'static, ()>) {
        let handle = tokio::spawn(task);
        self.launched
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.handles.lock().unwrap().push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_unbounded_runs_every_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let launcher = UnboundedLauncher;

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            launcher
                .launch(
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    .boxed(),
                )
                .await;
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_limits_in_flight_tasks() {
        let launcher = BoundedLauncher::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            launcher
                .launch(
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                    }
                    .boxed(),
                )
                .await;
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(running.load(Ordering::SeqCst), 0);
        assert_eq!(launcher.available(), 2);
    }

    #[test]
    fn test_zero_limit_still_allows_one_task() {
        assert_eq!(BoundedLauncher::new(0).available(), 1);
    }
}
