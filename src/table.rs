use anyhow::Result;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

/// An in-memory tabular dataset: the header row plus every data row, kept
/// verbatim in file order. Never mutated after load.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        self.headers.as_slice()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.as_slice()
    }

    /// Position of a named column. A missing column is an error, not a
    /// recoverable condition.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        match self.headers.iter().position(|h| h == name) {
            Some(index) => Ok(index),
            None => anyhow::bail!(
                "Column '{}' not found; available columns: {}",
                name,
                self.headers.join(", ")
            ),
        }
    }

    /// Every value of a named column, in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &str> + '_> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| row[index].as_str()))
    }
}

/// Serializes as the raw record list: one object per row, keys in header
/// order.
impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RecordRow {
                headers: &self.headers,
                row,
            })?;
        }
        seq.end()
    }
}

struct RecordRow<'a> {
    headers: &'a [String],
    row: &'a [String],
}

impl Serialize for RecordRow<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.row.len()))?;
        for (header, value) in self.headers.iter().zip(self.row.iter()) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            vec!["state".to_string(), "city".to_string()],
            vec![
                vec!["CA".to_string(), "LA".to_string()],
                vec!["NY".to_string(), "NYC".to_string()],
            ],
        )
    }

    #[test]
    fn column_index_finds_named_column() {
        let table = sample_table();
        assert_eq!(table.column_index("state").unwrap(), 0);
        assert_eq!(table.column_index("city").unwrap(), 1);
    }

    #[test]
    fn column_index_missing_column_is_an_error() {
        let table = sample_table();
        let err = table.column_index("zipcode").unwrap_err();
        assert!(err.to_string().contains("zipcode"));
    }

    #[test]
    fn column_yields_values_in_row_order() {
        let table = sample_table();
        let states: Vec<&str> = table.column("state").unwrap().collect();
        assert_eq!(states, vec!["CA", "NY"]);
    }

    #[test]
    fn serializes_as_record_list_in_header_order() {
        let table = sample_table();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"state":"CA","city":"LA"},{"state":"NY","city":"NYC"}]"#
        );
    }
}
