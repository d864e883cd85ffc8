use std::path::{Path, PathBuf};

use crate::core::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a listed directory, captured once and never re-validated.
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    /// Position in the parent's listing, used to keep ties in discovery order.
    pub index: usize,
}

impl FsEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Display name of a path: its last component, or the whole path for roots.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// The directory could not be listed.
    Empty,
    /// Processing the directory failed part way.
    Error,
}

impl Sentinel {
    pub fn marker(self) -> &'static str {
        match self {
            Sentinel::Empty => "*EMPTY",
            Sentinel::Error => "*ERROR",
        }
    }
}

/// Rendered report text plus total byte size for one subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub text: String,
    pub size: i64,
}

impl AggregateResult {
    pub fn new(text: String, size: i64) -> Self {
        Self { text, size }
    }

    /// A zero-sized placeholder for a directory that produced no real listing.
    pub fn sentinel(name: &str, depth: usize, sentinel: Sentinel) -> Self {
        Self {
            text: report::render_sentinel(depth, name, sentinel),
            size: 0,
        }
    }

    /// Wrap a subdirectory's own result with its header line at `depth`.
    pub fn with_header(depth: usize, name: &str, nested: AggregateResult) -> Self {
        let mut text = report::render_line(depth, name, nested.size);
        text.push_str(&nested.text);
        Self {
            text,
            size: nested.size,
        }
    }

    pub fn human_readable_size(&self) -> String {
        super::size::human_readable_size(self.size)
    }
}
