use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::args::Args;
use crate::table::Table;

/// Reads a delimited dataset with a header row into a [`Table`]. A missing
/// or malformed file is a fatal startup error; there is no retry and no
/// fallback.
pub fn load_table(path: &Path) -> Result<Table> {
    let start_time = Instant::now();
    info!(action = "start", component = "table_load", path = ?path, "Loading dataset");

    if !path.exists() {
        anyhow::bail!("Dataset file not found at {:?}", path);
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset at {:?}", path))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {:?}", path))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("Malformed row in {:?}", path))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let load_time = start_time.elapsed();
    info!(
        action = "complete",
        component = "table_load",
        path = ?path,
        row_count = rows.len(),
        column_count = headers.len(),
        duration_ms = load_time.as_millis(),
        "Dataset loaded"
    );

    Ok(Table::new(headers, rows))
}

/// Both input tables, loaded exactly once per process. Every aggregation
/// borrows this context; nothing is reloaded or mutated afterwards.
#[derive(Debug)]
pub struct Datasets {
    pub records: Table,
    pub income: Table,
}

impl Datasets {
    pub fn load(args: &Args) -> Result<Datasets> {
        let records = load_table(&args.data)?;
        let income = load_table(&args.income)?;

        // State keys on both sides of the join are expected to be
        // two-letter abbreviations; off-shape values are reported but do
        // not fail the load. A key with no match simply aggregates to an
        // empty income list.
        let abbreviation = Regex::new(r"^[A-Z]{2}$")?;
        check_state_keys(&records, "state", &abbreviation);
        check_state_keys(&income, "State_ab", &abbreviation);

        Ok(Datasets { records, income })
    }
}

fn check_state_keys(table: &Table, column: &str, abbreviation: &Regex) {
    // A missing column is reported at first aggregation, not here.
    let values = match table.column(column) {
        Ok(values) => values,
        Err(_) => return,
    };

    let suspect_count = values.filter(|value| !abbreviation.is_match(value)).count();
    if suspect_count > 0 {
        warn!(
            action = "check",
            component = "table_load",
            column = column,
            suspect_count,
            "State keys do not look like two-letter abbreviations"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn args_for(data: PathBuf, income: PathBuf) -> Args {
        Args {
            data,
            income,
            top: 10,
            cities: 5,
            json: false,
            output: None,
            verbose: false,
            workers: None,
        }
    }

    #[test]
    fn load_table_reads_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "state,city\nCA,LA\nNY,NYC\n");

        let table = load_table(&path).unwrap();
        assert_eq!(table.headers(), ["state", "city"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["CA", "LA"]);
    }

    #[test]
    fn load_table_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_table_rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "state,city\nCA\n");
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn datasets_load_wires_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_csv(&dir, "data.csv", "state,city\nCA,LA\n");
        let income = write_csv(&dir, "income.csv", "State_ab,Mean\nCA,70000\n");

        let datasets = Datasets::load(&args_for(data, income)).unwrap();
        assert_eq!(datasets.records.len(), 1);
        assert_eq!(datasets.income.len(), 1);
    }

    #[test]
    fn datasets_load_tolerates_off_shape_state_keys() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_csv(&dir, "data.csv", "state,city\nCalifornia,LA\n");
        let income = write_csv(&dir, "income.csv", "State_ab,Mean\nCA,70000\n");

        // Off-shape keys only warn; the load itself succeeds.
        let datasets = Datasets::load(&args_for(data, income)).unwrap();
        assert_eq!(datasets.records.len(), 1);
    }
}
