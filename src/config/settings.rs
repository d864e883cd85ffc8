pub const DEFAULT_MAX_PRINT_DEPTH: usize = 100;

/// Immutable per-run settings for a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Hide file lines from the report; their sizes still count.
    pub only_dirs: bool,
    /// Entries listed deeper than this are sized but not rendered.
    pub max_print_depth: usize,
    /// `Some(n)` enables parallel dispatch onto a pool of `n` workers.
    pub parallel_workers: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            only_dirs: false,
            max_print_depth: DEFAULT_MAX_PRINT_DEPTH,
            parallel_workers: None,
        }
    }
}

impl Settings {
    pub fn is_parallel(&self) -> bool {
        self.parallel_workers.is_some()
    }

    /// Worker threads to start. A serial run still needs one to drive I/O.
    pub fn worker_count(&self) -> usize {
        self.parallel_workers.unwrap_or(1).max(1)
    }
}
