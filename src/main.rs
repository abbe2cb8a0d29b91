use anyhow::Result;
use clap::Parser;
use tracing::error;

use statewise::dataset::Datasets;
use statewise::{analysis, utils, Args};

fn run(args: &Args) -> Result<()> {
    let datasets = Datasets::load(args)?;
    let data = analysis::compute_dashboard(&datasets)?;

    if args.json {
        analysis::write_json(&data, args)?;
    } else {
        analysis::print_dashboard(&data, args);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;
    utils::init_worker_pool(args.workers)?;

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
