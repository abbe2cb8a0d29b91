use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use crate::table::Table;

/// Value counts for one column, most frequent first. Ties keep the order
/// the tied keys first appear in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts(Vec<(String, u64)>);

impl CategoryCounts {
    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.0.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    /// Sum of every count, i.e. the number of rows that were counted.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

/// Serializes as a JSON object whose entries keep the descending-count
/// order.
impl Serialize for CategoryCounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Orders merged counts descending by count, ascending by first row index
/// for ties.
fn into_sorted(counts: HashMap<String, (u64, usize)>) -> CategoryCounts {
    let mut entries: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(key, (count, first_row))| (key, count, first_row))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    CategoryCounts(entries.into_iter().map(|(key, count, _)| (key, count)).collect())
}

/// Counts rows per distinct value of `key_column` across the whole table.
pub fn count_by(table: &Table, key_column: &str) -> Result<CategoryCounts> {
    let start_time = Instant::now();
    let index = table.column_index(key_column)?;

    // Rayon fold/merge: each chunk counts into its own map, tracking the
    // lowest row index seen per key so ties stay deterministic.
    let batch_counts: Vec<HashMap<String, (u64, usize)>> = table
        .rows()
        .par_iter()
        .enumerate()
        .fold(
            HashMap::new,
            |mut acc: HashMap<String, (u64, usize)>, (row_index, row)| {
                let entry = acc.entry(row[index].clone()).or_insert((0, row_index));
                entry.0 += 1;
                if row_index < entry.1 {
                    entry.1 = row_index;
                }
                acc
            },
        )
        .collect();

    let mut merged: HashMap<String, (u64, usize)> = HashMap::new();
    for batch in batch_counts {
        for (key, (count, first_row)) in batch {
            let entry = merged.entry(key).or_insert((0, first_row));
            entry.0 += count;
            if first_row < entry.1 {
                entry.1 = first_row;
            }
        }
    }

    let counts = into_sorted(merged);
    info!(
        action = "complete",
        component = "count_by",
        column = key_column,
        distinct_keys = counts.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Value counts computed"
    );
    Ok(counts)
}

/// Counts rows per distinct value of `inner_key_column`, restricted to rows
/// where `outer_key_column` equals `outer_value`.
pub fn count_by_within(
    table: &Table,
    outer_key_column: &str,
    outer_value: &str,
    inner_key_column: &str,
) -> Result<CategoryCounts> {
    let outer_index = table.column_index(outer_key_column)?;
    let inner_index = table.column_index(inner_key_column)?;

    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    for (row_index, row) in table.rows().iter().enumerate() {
        if row[outer_index] != outer_value {
            continue;
        }
        let entry = counts.entry(row[inner_index].clone()).or_insert((0, row_index));
        entry.0 += 1;
    }

    Ok(into_sorted(counts))
}

/// Numeric values of `value_column` from rows where `key_column` equals
/// `key_value`, in row order. An unknown key yields an empty list.
pub fn values_for(
    table: &Table,
    key_column: &str,
    key_value: &str,
    value_column: &str,
) -> Result<Vec<f64>> {
    let key_index = table.column_index(key_column)?;
    let value_index = table.column_index(value_column)?;

    let mut values = Vec::new();
    for (row_index, row) in table.rows().iter().enumerate() {
        if row[key_index] != key_value {
            continue;
        }
        let parsed: f64 = row[value_index].parse().with_context(|| {
            format!(
                "Non-numeric value '{}' in column '{}' at row {}",
                row[value_index],
                value_column,
                row_index + 1
            )
        })?;
        values.push(parsed);
    }

    Ok(values)
}

/// Numeric values of `value_column` from every row, in row order.
pub fn all_values(table: &Table, value_column: &str) -> Result<Vec<f64>> {
    let value_index = table.column_index(value_column)?;

    let mut values = Vec::with_capacity(table.len());
    for (row_index, row) in table.rows().iter().enumerate() {
        let parsed: f64 = row[value_index].parse().with_context(|| {
            format!(
                "Non-numeric value '{}' in column '{}' at row {}",
                row[value_index],
                value_column,
                row_index + 1
            )
        })?;
        values.push(parsed);
    }

    Ok(values)
}
