use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Run-wide counters shared by every task of one traversal.
///
/// Counters only ever grow. Increments use relaxed ordering since nothing
/// synchronizes through them; totals are read after the walk has joined.
pub struct RunStats {
    pub entries_visited: AtomicU64,
    pub async_granted: AtomicU64,
    pub async_denied: AtomicU64,
    pub start_time: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            entries_visited: AtomicU64::new(0),
            async_granted: AtomicU64::new(0),
            async_denied: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Count one visited entry and return the new total.
    pub fn increment_visited(&self) -> u64 {
        self.entries_visited.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn increment_granted(&self) {
        self.async_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_denied(&self) {
        self.async_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed = self.elapsed();
        let entries_visited = self.entries_visited.load(Ordering::Relaxed);
        StatsSnapshot {
            entries_visited,
            async_granted: self.async_granted.load(Ordering::Relaxed),
            async_denied: self.async_denied.load(Ordering::Relaxed),
            elapsed,
            entries_per_second: per_second(entries_visited, elapsed),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs < f64::EPSILON {
        return 0.0;
    }
    count as f64 / secs
}

#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub entries_visited: u64,
    pub async_granted: u64,
    pub async_denied: u64,
    pub elapsed: Duration,
    pub entries_per_second: f64,
}
