use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "statewise",
    about = "Aggregate state, city, and household income statistics from tabular datasets",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to the record dataset
    #[arg(short, long, default_value = "static/data/final_data.csv")]
    pub data: PathBuf,

    /// Path to the cleaned income dataset
    #[arg(short, long, default_value = "static/data/income_data_cleaned.csv")]
    pub income: PathBuf,

    /// Number of top states to display in the summary
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,

    /// Number of cities to display per state
    #[arg(long, default_value_t = 5)]
    pub cities: usize,

    /// Emit the full aggregate mappings as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,
}
