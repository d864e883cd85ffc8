use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Fixed-capacity executor that traversal tasks are submitted to.
///
/// A task counts as busy from the moment it is submitted until it finishes,
/// so queued work is already visible to admission checks.
#[derive(Clone)]
pub struct WorkerPool {
    handle: Handle,
    capacity: usize,
    busy: Arc<AtomicUsize>,
}

impl WorkerPool {
    pub fn new(handle: Handle, capacity: usize) -> Self {
        Self {
            handle,
            capacity,
            busy: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Pool over the runtime the caller is running on.
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current(capacity: usize) -> Self {
        Self::new(Handle::current(), capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn busy_workers(&self) -> usize {
        self.busy.load(Ordering::Relaxed)
    }

    pub fn submit<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = BusyGuard::acquire(Arc::clone(&self.busy));
        self.handle.spawn(async move {
            let _guard = guard;
            task.await
        })
    }
}

struct BusyGuard(Arc<AtomicUsize>);

impl BusyGuard {
    fn acquire(busy: Arc<AtomicUsize>) -> Self {
        busy.fetch_add(1, Ordering::Relaxed);
        Self(busy)
    }
}

// Runs on panic too, so a failed task never leaks a busy slot.
impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}
