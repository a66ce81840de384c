use crate::error::Result;
use crate::table::Table;
use tracing::debug;

/// Reserved prefix for the transient label used mid-swap. Extended with
/// underscores until it collides with nothing in the table.
const PLACEHOLDER_PREFIX: &str = "__swap_tmp";

/// Swap the labels of two columns.
///
/// The data previously under `a` ends up under `b` and vice versa; column
/// positions and row order are untouched. Errors with a missing-column error
/// if either name is absent. Callers never observe a duplicate label: the
/// three renames happen within one mutable borrow.
pub fn swap_columns(table: &mut Table, a: &str, b: &str) -> Result<()> {
    table.column_index(a)?;
    table.column_index(b)?;
    if a == b {
        return Ok(());
    }
    let tmp = placeholder(table);
    debug!("swapping column labels '{}' <-> '{}'", a, b);
    table.rename_column(a, &tmp)?;
    table.rename_column(b, a)?;
    table.rename_column(&tmp, b)?;
    Ok(())
}

fn placeholder(table: &Table) -> String {
    let mut name = PLACEHOLDER_PREFIX.to_string();
    while table.has_column(&name) {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn sample() -> Table {
        let mut t = Table::new(["Annual_yield", "Crop_type"]).unwrap();
        t.push_row(vec![Value::from("tea"), Value::Number(3.2)])
            .unwrap();
        t
    }

    #[test]
    fn swap_reassigns_data_to_new_labels() {
        let mut t = sample();
        swap_columns(&mut t, "Annual_yield", "Crop_type").unwrap();
        assert_eq!(t.get(0, "Crop_type").unwrap(), &Value::from("tea"));
        assert_eq!(t.get(0, "Annual_yield").unwrap(), &Value::Number(3.2));
    }

    #[test]
    fn swap_twice_is_identity() {
        let mut t = sample();
        let original = t.clone();
        swap_columns(&mut t, "Annual_yield", "Crop_type").unwrap();
        swap_columns(&mut t, "Annual_yield", "Crop_type").unwrap();
        assert_eq!(t, original);
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut t = sample();
        assert!(swap_columns(&mut t, "Annual_yield", "Elevation").is_err());
    }

    #[test]
    fn placeholder_collision_is_tolerated() {
        let mut t = Table::new([PLACEHOLDER_PREFIX, "a", "b"]).unwrap();
        t.push_row(vec![Value::Null, Value::Number(1.0), Value::Number(2.0)])
            .unwrap();
        swap_columns(&mut t, "a", "b").unwrap();
        assert_eq!(t.get(0, "b").unwrap(), &Value::Number(1.0));
        assert!(t.has_column(PLACEHOLDER_PREFIX));
    }

    #[test]
    fn self_swap_is_a_no_op() {
        let mut t = sample();
        let original = t.clone();
        swap_columns(&mut t, "Crop_type", "Crop_type").unwrap();
        assert_eq!(t, original);
    }
}
