use crate::error::{PipelineError, Result};

/// A single cell in a record table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Numeric view of the cell. Numeric-looking text counts; Null does not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// An ordered collection of rows with named, uniquely-labeled columns.
///
/// Column order is insertion order; row order is ingestion order and is
/// preserved by every operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(PipelineError::InvalidFormat(format!(
                    "duplicate column '{name}'"
                )));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of a named column, or a missing-column error.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Append a row. The row must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::InvalidFormat(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Cell at a row/column position. Like slice indexing, panics if either
    /// index is out of range; valid positions come from `num_rows` and
    /// `column_index`.
    pub fn value_at(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    /// Overwrite the cell at a row/column position. Panics if either index
    /// is out of range.
    pub fn set_at(&mut self, row: usize, col: usize, value: Value) {
        self.rows[row][col] = value;
    }

    /// Cell lookup by row index and column name. Absent columns are an
    /// error; a row index out of range panics, as with `value_at`.
    pub fn get(&self, row: usize, column: &str) -> Result<&Value> {
        let idx = self.column_index(column)?;
        Ok(&self.rows[row][idx])
    }

    /// All cells of a named column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Relabel a column. The data stays where it is; only the name changes.
    /// Renaming onto an existing label is refused; column names stay unique.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let idx = self.column_index(from)?;
        if from != to && self.has_column(to) {
            return Err(PipelineError::InvalidFormat(format!(
                "duplicate column '{to}'"
            )));
        }
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// Append a new column with one cell per existing row.
    pub fn add_column(&mut self, name: &str, cells: Vec<Value>) -> Result<()> {
        if self.has_column(name) {
            return Err(PipelineError::InvalidFormat(format!(
                "duplicate column '{name}'"
            )));
        }
        if cells.len() != self.rows.len() {
            return Err(PipelineError::InvalidFormat(format!(
                "column '{}' has {} cells, table has {} rows",
                name,
                cells.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    /// Remove a column and its cells from every row.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(["Field_ID", "Crop_type"]).unwrap();
        t.push_row(vec![Value::Number(1.0), Value::from("tea")])
            .unwrap();
        t.push_row(vec![Value::Number(2.0), Value::from("wheat")])
            .unwrap();
        t
    }

    #[test]
    fn duplicate_columns_rejected() {
        assert!(Table::new(["a", "a"]).is_err());
    }

    #[test]
    fn push_row_checks_arity() {
        let mut t = sample();
        assert!(t.push_row(vec![Value::Null]).is_err());
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn rename_keeps_data_in_place() {
        let mut t = sample();
        t.rename_column("Crop_type", "Crop").unwrap();
        assert_eq!(t.get(0, "Crop").unwrap(), &Value::from("tea"));
        assert!(t.get(0, "Crop_type").is_err());
    }

    #[test]
    fn rename_onto_existing_label_refused() {
        let mut t = sample();
        assert!(t.rename_column("Crop_type", "Field_ID").is_err());
    }

    #[test]
    fn drop_column_removes_exactly_one() {
        let mut t = sample();
        t.drop_column("Field_ID").unwrap();
        assert_eq!(t.num_columns(), 1);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.rows()[0].len(), 1);
    }

    #[test]
    fn add_column_aligns_by_row() {
        let mut t = sample();
        t.add_column("Elevation", vec![Value::Number(10.0), Value::Number(-4.0)])
            .unwrap();
        assert_eq!(t.get(1, "Elevation").unwrap(), &Value::Number(-4.0));
        assert!(t
            .add_column("Short", vec![Value::Null])
            .is_err());
    }

    #[test]
    fn absent_column_is_an_error_not_a_panic() {
        let t = sample();
        assert!(t.get(0, "Elevation").is_err());
    }

    #[test]
    #[should_panic]
    fn out_of_range_row_panics() {
        let t = sample();
        let _ = t.get(9, "Crop_type");
    }

    #[test]
    fn numeric_view_of_text() {
        assert_eq!(Value::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Value::from("maize").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }
}
