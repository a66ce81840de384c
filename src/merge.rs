use std::collections::HashMap;

use tracing::info;

use crate::error::Result;
use crate::ingest;
use crate::table::{Table, Value};

/// Where the weather-station mapping table comes from. The pipeline only
/// ever asks for a fresh copy; nothing is cached between merges.
pub trait MappingSource {
    fn fetch(&self) -> Result<Table>;
}

/// Mapping table hosted as a CSV file behind a URL.
pub struct HttpCsvSource {
    url: String,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl MappingSource for HttpCsvSource {
    fn fetch(&self) -> Result<Table> {
        ingest::fetch_csv(&self.url)
    }
}

/// Left-join `mapping` onto `left` on the shared key column.
///
/// Every left row appears exactly once, in its original order. Matched keys
/// pull in the mapping's attribute columns; unmatched or null keys leave
/// them null. Duplicate keys on the mapping side: first occurrence wins.
pub fn left_join(left: &Table, mapping: &Table, key: &str) -> Result<Table> {
    let left_key = left.column_index(key)?;
    let mapping_key = mapping.column_index(key)?;

    let attribute_indices: Vec<usize> = (0..mapping.num_columns())
        .filter(|&i| i != mapping_key)
        .collect();

    let mut index: HashMap<String, usize> = HashMap::new();
    for (row, cells) in mapping.rows().iter().enumerate() {
        if let Some(repr) = key_repr(&cells[mapping_key]) {
            index.entry(repr).or_insert(row);
        }
    }

    let columns: Vec<String> = left
        .columns()
        .iter()
        .cloned()
        .chain(
            attribute_indices
                .iter()
                .map(|&i| mapping.columns()[i].clone()),
        )
        .collect();
    let mut joined = Table::new(columns)?;

    for cells in left.rows() {
        let mut row = cells.clone();
        let matched = key_repr(&cells[left_key]).and_then(|repr| index.get(&repr));
        match matched {
            Some(&mapping_row) => {
                for &i in &attribute_indices {
                    row.push(mapping.value_at(mapping_row, i).clone());
                }
            }
            None => row.extend(std::iter::repeat(Value::Null).take(attribute_indices.len())),
        }
        joined.push_row(row)?;
    }
    Ok(joined)
}

/// Fetch the mapping table and left-join it onto `table`.
pub fn merge_mapping(table: &Table, source: &dyn MappingSource, key: &str) -> Result<Table> {
    table.column_index(key)?;
    let mapping = source.fetch()?;
    let joined = left_join(table, &mapping, key)?;
    info!(
        "merged mapping table: {} rows, {} columns",
        joined.num_rows(),
        joined.num_columns()
    );
    Ok(joined)
}

/// Canonical form of a join key so numeric and text representations of the
/// same identifier compare equal. Null keys never match.
fn key_repr(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(format!("{n}")),
        Value::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) => Some(format!("{n}")),
                Err(_) => Some(trimmed.to_string()),
            }
        }
        Value::Null => None,
    }
}
