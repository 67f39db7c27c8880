// src/crawl/stats.rs
// =============================================================================
// Throughput statistics sampled while the crawl runs.
//
// A background task wakes up on a fixed period (60 seconds by default),
// reads the visited and frontier sizes, and appends one point to each of two
// series:
// - visited count over elapsed minutes
// - visited / max(1, frontier size) over elapsed minutes
//
// The sampler only reads the frontier and visited set; it never changes them.
//
// The clock starts when the sampler is spawned, and ticks are scheduled on
// a fixed grid (period, 2 * period, ...) so slow samples do not push later
// ones back.
//
// Stopping:
// - The driver cancels a CancellationToken
// - The sampler notices it at its next wait, records one last point and
//   returns. A sample is never interrupted halfway through.
// - stop() hands back everything collected.
// =============================================================================

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::frontier::Frontier;
use super::visited::VisitedSet;

/// One point of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub elapsed_minutes: f64,
    pub value: f64,
}

/// The two series collected over a crawl.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSeries {
    pub visited: Vec<Sample>,
    pub visited_to_frontier_ratio: Vec<Sample>,
}

impl StatsSeries {
    // Both series start at the origin so a plot always has a first point
    fn with_origin() -> Self {
        let origin = Sample {
            elapsed_minutes: 0.0,
            value: 0.0,
        };
        Self {
            visited: vec![origin],
            visited_to_frontier_ratio: vec![origin],
        }
    }
}

/// Append-only stats shared between the sampler task and the driver.
#[derive(Debug)]
pub struct CrawlStats {
    started: Instant,
    series: Mutex<StatsSeries>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            series: Mutex::new(StatsSeries::with_origin()),
        }
    }

    /// Reads both sizes and appends one point to each series.
    pub fn sample(&self, visited: &VisitedSet, frontier: &Frontier) {
        let elapsed_minutes = self.started.elapsed().as_secs_f64() / 60.0;
        let visited_count = visited.size() as f64;
        let frontier_size = frontier.size().max(1) as f64;

        let mut series = self.series.lock().unwrap_or_else(PoisonError::into_inner);
        series.visited.push(Sample {
            elapsed_minutes,
            value: visited_count,
        });
        series.visited_to_frontier_ratio.push(Sample {
            elapsed_minutes,
            value: visited_count / frontier_size,
        });
    }

    /// A copy of everything collected so far.
    pub fn snapshot(&self) -> StatsSeries {
        self.series
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the background sampler.
pub struct StatsSampler {
    stats: Arc<CrawlStats>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatsSampler {
    /// Starts sampling every `period` on a new task. Elapsed time is
    /// measured from this call.
    pub fn spawn(visited: Arc<VisitedSet>, frontier: Arc<Frontier>, period: Duration) -> Self {
        let stats = Arc::new(CrawlStats::new());
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task_stats = Arc::clone(&stats);
        // interval() fires right away; the first point after the origin
        // belongs one period in
        let first_tick = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        task_stats.sample(&visited, &frontier);
                        break;
                    }
                    _ = ticker.tick() => {
                        task_stats.sample(&visited, &frontier);
                    }
                }
            }
            tracing::debug!("stats sampler stopped");
        });

        Self {
            stats,
            cancel,
            handle,
        }
    }

    /// What has been collected so far, while the sampler keeps running.
    #[cfg(test)]
    pub fn snapshot(&self) -> StatsSeries {
        self.stats.snapshot()
    }

    /// Signals the sampler, waits for it to finish its current cycle and
    /// returns both series.
    pub async fn stop(self) -> StatsSeries {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "stats sampler task failed");
        }
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> (Arc<CrawlStats>, Arc<VisitedSet>, Arc<Frontier>) {
        (
            Arc::new(CrawlStats::new()),
            Arc::new(VisitedSet::new()),
            Arc::new(Frontier::new()),
        )
    }

    #[test]
    fn test_series_start_at_origin() {
        let stats = CrawlStats::new();
        let series = stats.snapshot();
        assert_eq!(series.visited.len(), 1);
        assert_eq!(series.visited[0].value, 0.0);
        assert_eq!(series.visited_to_frontier_ratio[0].elapsed_minutes, 0.0);
    }

    #[tokio::test]
    async fn test_ratio_floors_frontier_at_one() {
        let (stats, visited, frontier) = shared();
        visited.add("https://a.example");
        visited.add("https://b.example");

        stats.sample(&visited, &frontier);
        let series = stats.snapshot();
        assert_eq!(series.visited[1].value, 2.0);
        assert_eq!(series.visited_to_frontier_ratio[1].value, 2.0);

        for i in 0..4 {
            frontier.enqueue(format!("https://example.com/{}", i));
        }
        stats.sample(&visited, &frontier);
        let series = stats.snapshot();
        assert_eq!(series.visited_to_frontier_ratio[2].value, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_ticks_on_period() {
        let (_, visited, frontier) = shared();
        let sampler = StatsSampler::spawn(visited.clone(), frontier, Duration::from_secs(60));

        visited.add("https://a.example");
        tokio::time::sleep(Duration::from_secs(150)).await;

        // Origin + ticks at 60s and 120s
        let series = sampler.snapshot();
        assert_eq!(series.visited.len(), 3);
        assert!((series.visited[1].elapsed_minutes - 1.0).abs() < 1e-6);
        assert!((series.visited[2].elapsed_minutes - 2.0).abs() < 1e-6);
        assert_eq!(series.visited[2].value, 1.0);

        // One last point when stopping
        let series = sampler.stop().await;
        assert_eq!(series.visited.len(), 4);
        assert_eq!(series.visited_to_frontier_ratio.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_stay_on_whole_periods() {
        let (_, visited, frontier) = shared();
        let sampler = StatsSampler::spawn(visited, frontier, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(10 * 60 + 30)).await;

        let series = sampler.stop().await;
        // Origin, ten ticks, and the stop sample
        assert_eq!(series.visited.len(), 12);
        for (minute, point) in series.visited[1..11].iter().enumerate() {
            assert!((point.elapsed_minutes - (minute + 1) as f64).abs() < 1e-6);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_starts_when_sampler_spawns() {
        let (_, visited, frontier) = shared();
        // Time spent before the crawl starts must not show up in the series
        tokio::time::sleep(Duration::from_secs(10 * 60)).await;

        let sampler = StatsSampler::spawn(visited, frontier, Duration::from_secs(60));
        let series = sampler.stop().await;

        assert_eq!(series.visited.len(), 2);
        assert!(series.visited[1].elapsed_minutes < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_prompt() {
        let (_, visited, frontier) = shared();
        let sampler = StatsSampler::spawn(visited, frontier, Duration::from_secs(60));

        let before = Instant::now();
        let series = sampler.stop().await;
        assert!(before.elapsed() < Duration::from_secs(60));
        assert_eq!(series.visited.len(), 2);
    }
}
