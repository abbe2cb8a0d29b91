pub mod aggregate;
pub mod analysis;
pub mod args;
pub mod dataset;
pub mod stats;
pub mod table;
pub mod utils;

pub use aggregate::{all_values, count_by, count_by_within, values_for, CategoryCounts};
pub use args::Args;
pub use dataset::{load_table, Datasets};
pub use stats::DashboardData;
pub use table::Table;
