use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table::{Table, Value};

/// Exact-match lookup for repairing malformed categorical tokens.
/// Supplied once at construction and never mutated during processing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct CorrectionMap(HashMap<String, String>);

impl CorrectionMap {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CorrectionMap {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Replace every cell of a numeric column with its absolute value.
/// Idempotent. A cell that cannot be read as a number is an error.
pub fn absolute_values(table: &mut Table, column: &str) -> Result<()> {
    let idx = table.column_index(column)?;
    for row in 0..table.num_rows() {
        let n = table
            .value_at(row, idx)
            .as_f64()
            .ok_or_else(|| PipelineError::NonNumericCell {
                column: column.to_string(),
                row,
            })?;
        table.set_at(row, idx, Value::Number(n.abs()));
    }
    debug!("normalized column '{}' to absolute values", column);
    Ok(())
}

/// Normalize a categorical column: trim each string cell, then replace the
/// trimmed token with its correction-map entry if one exists.
///
/// Trimming comes first so a map keyed on exact tokens cannot miss due to
/// stray whitespace. Non-string cells pass through untouched.
pub fn correct_categories(
    table: &mut Table,
    column: &str,
    corrections: &CorrectionMap,
) -> Result<()> {
    let idx = table.column_index(column)?;
    for row in 0..table.num_rows() {
        let corrected = match table.value_at(row, idx) {
            Value::Text(s) => {
                let trimmed = s.trim();
                let fixed = corrections.get(trimmed).unwrap_or(trimmed);
                if fixed == s.as_str() {
                    continue;
                }
                Value::Text(fixed.to_string())
            }
            _ => continue,
        };
        table.set_at(row, idx, corrected);
    }
    debug!("corrected categorical column '{}'", column);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop_corrections() -> CorrectionMap {
        CorrectionMap::from([("cassaval", "cassava"), ("wheatn", "wheat"), ("teaa", "tea")])
    }

    fn table_with(column: &str, cells: Vec<Value>) -> Table {
        let mut t = Table::new([column]).unwrap();
        for cell in cells {
            t.push_row(vec![cell]).unwrap();
        }
        t
    }

    #[test]
    fn mapped_token_is_trimmed_then_corrected() {
        let mut t = table_with("Crop_type", vec![Value::from("  cassaval ")]);
        correct_categories(&mut t, "Crop_type", &crop_corrections()).unwrap();
        assert_eq!(t.get(0, "Crop_type").unwrap(), &Value::from("cassava"));
    }

    #[test]
    fn unmapped_token_is_only_trimmed() {
        let mut t = table_with("Crop_type", vec![Value::from(" maize ")]);
        correct_categories(&mut t, "Crop_type", &crop_corrections()).unwrap();
        assert_eq!(t.get(0, "Crop_type").unwrap(), &Value::from("maize"));
    }

    #[test]
    fn non_string_cells_pass_through() {
        let mut t = table_with("Crop_type", vec![Value::Null, Value::Number(7.0)]);
        correct_categories(&mut t, "Crop_type", &crop_corrections()).unwrap();
        assert_eq!(t.get(0, "Crop_type").unwrap(), &Value::Null);
        assert_eq!(t.get(1, "Crop_type").unwrap(), &Value::Number(7.0));
    }

    #[test]
    fn absolute_values_leaves_nothing_negative() {
        let mut t = table_with(
            "Elevation",
            vec![Value::Number(-12.0), Value::Number(3.5), Value::from("-8")],
        );
        absolute_values(&mut t, "Elevation").unwrap();
        for cell in t.column("Elevation").unwrap() {
            assert!(cell.as_f64().unwrap() >= 0.0);
        }
    }

    #[test]
    fn absolute_values_is_idempotent() {
        let mut t = table_with("Elevation", vec![Value::Number(-12.0), Value::Number(0.0)]);
        absolute_values(&mut t, "Elevation").unwrap();
        let once = t.clone();
        absolute_values(&mut t, "Elevation").unwrap();
        assert_eq!(t, once);
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        let mut t = table_with("Elevation", vec![Value::Number(1.0), Value::from("tall")]);
        let err = absolute_values(&mut t, "Elevation").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NonNumericCell { ref column, row: 1 } if column == "Elevation"
        ));
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut t = table_with("Elevation", vec![]);
        assert!(correct_categories(&mut t, "Crop_type", &crop_corrections()).is_err());
    }
}
