use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::aggregate::CategoryCounts;
use crate::table::Table;

/// Everything the presentation layer consumes for one render, recomputed
/// from the loaded tables on every call. `city_counts` and `state_income`
/// follow the key order of `state_counts`.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub state_counts: CategoryCounts,
    #[serde(serialize_with = "ordered_map")]
    pub city_counts: Vec<(String, CategoryCounts)>,
    #[serde(serialize_with = "ordered_map")]
    pub state_income: Vec<(String, Vec<f64>)>,
    pub us_income: Vec<f64>,
    pub records: Table,
}

fn ordered_map<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
