use std::path::PathBuf;

use clap::Parser;

use dirsize::config::settings::{Settings, DEFAULT_MAX_PRINT_DEPTH};
use dirsize::core::pool::WorkerPool;
use dirsize::core::walker::Walker;

#[derive(Parser, Debug)]
#[command(name = "dirsize", version, about = "Parallel directory size analyzer")]
struct Cli {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Only list directories; file sizes still count toward totals
    #[arg(long)]
    only_dirs: bool,

    /// Walk subdirectories in parallel on a pool of N workers
    #[arg(long, value_name = "N")]
    parallel: Option<usize>,

    /// Deepest level printed in the report (traversal always goes all the way)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_PRINT_DEPTH)]
    max_depth: usize,

    /// Also print how many subdirectories were granted or denied a worker
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (logs to stderr)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::default();
    settings.only_dirs = cli.only_dirs;
    settings.max_print_depth = cli.max_depth;
    settings.parallel_workers = cli.parallel;

    let path = std::fs::canonicalize(&cli.path)?;

    let workers = settings.worker_count();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name("dirsize-worker")
        .enable_all()
        .build()?;

    let pool = WorkerPool::new(runtime.handle().clone(), workers);
    let walker = Walker::new(settings, pool);
    tracing::debug!(path = %path.display(), workers, "Starting walk");

    let result = runtime.block_on(walker.walk(path));
    let snapshot = walker.stats().snapshot();

    if cli.verbose {
        println!("Async granted: {}", snapshot.async_granted);
        println!("Async denied: {}", snapshot.async_denied);
    }

    print!("{}", result.text);
    println!("Total size: {}", result.human_readable_size());
    println!("Processing time: {}ms", snapshot.elapsed.as_millis());
    println!("Entries per second: {:.0}", snapshot.entries_per_second);
    println!("Entries total: {}", snapshot.entries_visited);

    Ok(())
}
