use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Caps the rayon pool used for the counting fold. Called once, before any
/// aggregation runs.
pub fn init_worker_pool(workers: Option<usize>) -> Result<()> {
    let worker_count = workers.unwrap_or_else(|| {
        let cpu_count = num_cpus::get();
        std::cmp::min(cpu_count, 8)
    });

    info!(
        action = "configure",
        component = "worker_pool",
        worker_count,
        "Using workers for aggregation"
    );

    rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build_global()
        .context("Failed to initialize worker pool")
}

pub fn format_number(num: u64) -> String {
    num.to_string()
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn validate_args(args: &crate::args::Args) -> Result<()> {
    if args.top == 0 {
        anyhow::bail!("--top must be greater than 0");
    }

    if args.cities == 0 {
        anyhow::bail!("--cities must be greater than 0");
    }

    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    Ok(())
}
