use super::stats::RunStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    SubmitAsync,
    RunInline,
}

/// Decides whether a subdirectory is handed to the pool or walked inline.
///
/// The busy count is read without synchronization and may be stale by the
/// time the task is submitted. That only affects utilization: a saturated
/// pool just pushes more recursion onto the caller's own task.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyGate {
    parallel: bool,
}

impl ConcurrencyGate {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn decide(&self, busy_workers: usize, capacity: usize, stats: &RunStats) -> Dispatch {
        if !self.parallel {
            return Dispatch::RunInline;
        }
        if busy_workers < capacity {
            stats.increment_granted();
            Dispatch::SubmitAsync
        } else {
            stats.increment_denied();
            Dispatch::RunInline
        }
    }
}
