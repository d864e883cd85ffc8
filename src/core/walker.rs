use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::settings::Settings;
use crate::models::entry::{entry_name, AggregateResult, EntryKind, FsEntry, Sentinel};

use super::error::{Result, WalkError};
use super::gate::{ConcurrencyGate, Dispatch};
use super::pool::WorkerPool;
use super::report::{self, ChildResult};
use super::stats::RunStats;

const PROGRESS_INTERVAL: u64 = 10_000;

type WalkFuture = Pin<Box<dyn Future<Output = AggregateResult> + Send>>;

/// State shared by every directory call of one walk.
struct WalkContext {
    settings: Settings,
    pool: WorkerPool,
    gate: ConcurrencyGate,
    stats: Arc<RunStats>,
}

impl WalkContext {
    fn record_visit(&self) {
        let visited = self.stats.increment_visited();
        if visited % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                visited,
                busy_workers = self.pool.busy_workers(),
                "Processed entries"
            );
        }
    }

    /// Sentinel for a directory at `depth`, without text past the print cutoff.
    fn sentinel(&self, name: &str, depth: usize, sentinel: Sentinel) -> AggregateResult {
        if depth > self.settings.max_print_depth {
            return AggregateResult::default();
        }
        AggregateResult::sentinel(name, depth, sentinel)
    }

    /// Entry for a subdirectory whose pool task never produced a result.
    fn failed_subdirectory(&self, dir: &FsEntry, depth: usize) -> AggregateResult {
        AggregateResult::with_header(
            depth,
            &dir.name,
            self.sentinel(&dir.name, depth + 1, Sentinel::Error),
        )
    }

    fn settle(
        &self,
        outcome: Result<AggregateResult>,
        path: &Path,
        name: &str,
        depth: usize,
    ) -> AggregateResult {
        match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Directory processing failed");
                self.sentinel(name, depth, Sentinel::Error)
            }
        }
    }
}

pub struct Walker {
    ctx: Arc<WalkContext>,
}

impl Walker {
    pub fn new(settings: Settings, pool: WorkerPool) -> Self {
        Self::with_stats(settings, pool, Arc::new(RunStats::new()))
    }

    pub fn with_stats(settings: Settings, pool: WorkerPool, stats: Arc<RunStats>) -> Self {
        let gate = ConcurrencyGate::new(settings.is_parallel());
        Self {
            ctx: Arc::new(WalkContext {
                settings,
                pool,
                gate,
                stats,
            }),
        }
    }

    pub fn stats(&self) -> &Arc<RunStats> {
        &self.ctx.stats
    }

    /// Walk `root` and return the rendered tree of its contents.
    ///
    /// The root itself gets no header line; its children start at depth 0.
    pub async fn walk(&self, root: PathBuf) -> AggregateResult {
        let name = entry_name(&root);
        walk_directory(root, name, 0, Arc::clone(&self.ctx)).await
    }
}

fn walk_directory(path: PathBuf, name: String, depth: usize, ctx: Arc<WalkContext>) -> WalkFuture {
    Box::pin(async move {
        let outcome = visit_directory(&path, &name, depth, &ctx).await;
        ctx.settle(outcome, &path, &name, depth)
    })
}

/// Walk a subdirectory one level down and prefix its header line at `depth`.
fn walk_subdirectory(entry: FsEntry, depth: usize, ctx: Arc<WalkContext>) -> WalkFuture {
    Box::pin(async move {
        let nested = walk_directory(entry.path, entry.name.clone(), depth + 1, ctx).await;
        AggregateResult::with_header(depth, &entry.name, nested)
    })
}

async fn visit_directory(
    path: &Path,
    name: &str,
    depth: usize,
    ctx: &Arc<WalkContext>,
) -> Result<AggregateResult> {
    let listing = {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || list_children(&path)).await?
    };

    let entries = match listing {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Directory not listable");
            return Ok(ctx.sentinel(name, depth, Sentinel::Empty));
        }
    };

    aggregate_entries(entries, depth, ctx).await
}

/// Size and render one directory's listed children.
async fn aggregate_entries(
    entries: Vec<FsEntry>,
    depth: usize,
    ctx: &Arc<WalkContext>,
) -> Result<AggregateResult> {
    let (dirs, files): (Vec<FsEntry>, Vec<FsEntry>) = entries.into_iter().partition(FsEntry::is_dir);

    let mut children = Vec::with_capacity(dirs.len() + files.len());
    let mut pending: Vec<(FsEntry, JoinHandle<AggregateResult>)> = Vec::new();

    for dir in dirs {
        let decision = ctx.gate.decide(
            ctx.pool.busy_workers(),
            ctx.pool.capacity(),
            &ctx.stats,
        );
        match decision {
            Dispatch::SubmitAsync => {
                let handle = ctx.pool.submit(walk_subdirectory(dir.clone(), depth, Arc::clone(ctx)));
                pending.push((dir, handle));
            }
            Dispatch::RunInline => {
                let index = dir.index;
                let result = walk_subdirectory(dir, depth, Arc::clone(ctx)).await;
                ctx.record_visit();
                children.push(ChildResult { index, result });
            }
        }
    }

    // Every submitted subtree must finish before this directory is sized.
    for (dir, handle) in pending {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(path = %dir.path.display(), error = %e, "Subdirectory task failed");
                ctx.failed_subdirectory(&dir, depth)
            }
        };
        ctx.record_visit();
        children.push(ChildResult {
            index: dir.index,
            result,
        });
    }

    let sized = tokio::task::spawn_blocking(move || size_files(files)).await??;

    let mut hidden_size = 0i64;
    for (file, size) in sized {
        ctx.record_visit();
        if ctx.settings.only_dirs {
            hidden_size += size;
        } else {
            children.push(ChildResult {
                index: file.index,
                result: AggregateResult::new(report::render_line(depth, &file.name, size), size),
            });
        }
    }

    Ok(report::assemble(
        children,
        depth,
        ctx.settings.max_print_depth,
        hidden_size,
    ))
}

/// List the immediate children of `dir`. Symlinks are never walked into.
fn list_children(dir: &Path) -> std::io::Result<Vec<FsEntry>> {
    let mut entries = Vec::new();
    for (index, entry) in std::fs::read_dir(dir)?.enumerate() {
        let entry = entry?;
        let kind = if entry.file_type()?.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(FsEntry {
            path: entry.path(),
            name: entry.file_name().to_string_lossy().to_string(),
            kind,
            index,
        });
    }
    Ok(entries)
}

fn size_files(files: Vec<FsEntry>) -> Result<Vec<(FsEntry, i64)>> {
    files
        .into_iter()
        .map(|file| match file_size(&file.path) {
            Ok(len) => {
                let size = i64::try_from(len).unwrap_or(i64::MAX);
                Ok((file, size))
            }
            Err(source) => Err(WalkError::FileSize {
                path: file.path,
                source,
            }),
        })
        .collect()
}

/// Byte length of a file leaf, following symlinks to their target.
///
/// Links to directories and dangling links are sized by the link itself.
fn file_size(path: &Path) -> std::io::Result<u64> {
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => Ok(meta.len()),
        _ => std::fs::symlink_metadata(path).map(|meta| meta.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dirsize_walker_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create test dir");
        dir
    }

    #[test]
    fn list_children_classifies_entries() {
        let dir = make_test_dir("list");
        std::fs::write(dir.join("f"), b"abc").unwrap();
        std::fs::create_dir(dir.join("d")).unwrap();

        let mut entries = list_children(&dir).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "d");
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[1].name, "f");
        assert_eq!(entries[1].kind, EntryKind::File);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn list_children_fails_on_missing_or_file() {
        let dir = make_test_dir("list_fail");
        std::fs::write(dir.join("plain"), b"x").unwrap();

        assert!(list_children(&dir.join("missing")).is_err());
        assert!(list_children(&dir.join("plain")).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn size_files_reports_missing_file() {
        let dir = make_test_dir("size_missing");
        let gone = FsEntry {
            path: dir.join("gone"),
            name: "gone".into(),
            kind: EntryKind::File,
            index: 0,
        };
        let err = size_files(vec![gone]).unwrap_err();
        assert!(matches!(err, WalkError::FileSize { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_root_is_an_empty_sentinel() {
        let dir = make_test_dir("missing_root");
        let walker = Walker::new(Settings::default(), WorkerPool::current(1));
        let result = walker.walk(dir.join("nope")).await;
        assert_eq!(result.text, "nope*EMPTY\n");
        assert_eq!(result.size, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn entry(dir: &Path, name: &str, kind: EntryKind, index: usize) -> FsEntry {
        FsEntry {
            path: dir.join(name),
            name: name.into(),
            kind,
            index,
        }
    }

    fn context(settings: Settings) -> Arc<WalkContext> {
        let walker = Walker::new(settings, WorkerPool::current(1));
        Arc::clone(&walker.ctx)
    }

    #[tokio::test]
    async fn vanished_subdirectory_is_empty_and_keeps_parent_total() {
        let dir = make_test_dir("vanished_dir");
        std::fs::write(dir.join("f"), vec![b'x'; 100]).unwrap();
        let ctx = context(Settings::default());

        // "c" was listed but is gone by the time it is walked.
        let entries = vec![
            entry(&dir, "f", EntryKind::File, 0),
            entry(&dir, "c", EntryKind::Directory, 1),
        ];
        let result = aggregate_entries(entries, 0, &ctx).await.unwrap();

        assert_eq!(result.text, "f 100 B\nc 0 B\n  c*EMPTY\n");
        assert_eq!(result.size, 100);
        assert_eq!(ctx.stats.snapshot().entries_visited, 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unsizable_file_turns_directory_into_error() {
        let dir = make_test_dir("unsizable");
        std::fs::write(dir.join("kept"), b"abc").unwrap();
        let ctx = context(Settings::default());

        let entries = vec![
            entry(&dir, "kept", EntryKind::File, 0),
            entry(&dir, "gone", EntryKind::File, 1),
        ];
        let outcome = aggregate_entries(entries, 1, &ctx).await;
        assert!(matches!(outcome, Err(WalkError::FileSize { .. })));

        let nested = ctx.settle(outcome, &dir, "sub", 1);
        let wrapped = AggregateResult::with_header(0, "sub", nested);
        assert_eq!(wrapped.text, "sub 0 B\n  sub*ERROR\n");
        assert_eq!(wrapped.size, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_pool_task_renders_error_under_header() {
        let dir = make_test_dir("failed_task");
        let ctx = context(Settings::default());
        let sub = entry(&dir, "d", EntryKind::Directory, 0);

        let top = ctx.failed_subdirectory(&sub, 0);
        assert_eq!(top.text, "d 0 B\n  d*ERROR\n");
        assert_eq!(top.size, 0);

        let nested = ctx.failed_subdirectory(&sub, 1);
        assert_eq!(nested.text, "  d 0 B\n    d*ERROR\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn sentinels_respect_print_depth() {
        let dir = make_test_dir("sentinel_depth");
        let ctx = context(Settings {
            max_print_depth: 0,
            ..Settings::default()
        });

        let entries = vec![entry(&dir, "c", EntryKind::Directory, 0)];
        let result = aggregate_entries(entries, 0, &ctx).await.unwrap();
        assert_eq!(result.text, "c 0 B\n");

        let sub = entry(&dir, "d", EntryKind::Directory, 0);
        assert_eq!(ctx.failed_subdirectory(&sub, 0).text, "d 0 B\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn file_size_follows_links_to_files() {
        let dir = make_test_dir("file_size_links");
        std::fs::write(dir.join("big"), vec![b'x'; 5000]).unwrap();
        std::fs::create_dir(dir.join("inner")).unwrap();
        std::os::unix::fs::symlink(dir.join("big"), dir.join("to_file")).unwrap();
        std::os::unix::fs::symlink(dir.join("inner"), dir.join("to_dir")).unwrap();
        std::os::unix::fs::symlink(dir.join("missing"), dir.join("dangling")).unwrap();

        assert_eq!(file_size(&dir.join("to_file")).unwrap(), 5000);

        let link_len = |name: &str| std::fs::symlink_metadata(dir.join(name)).unwrap().len();
        assert_eq!(file_size(&dir.join("to_dir")).unwrap(), link_len("to_dir"));
        assert_eq!(file_size(&dir.join("dangling")).unwrap(), link_len("dangling"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
