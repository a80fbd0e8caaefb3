//! Shallow flattening of nested JSON records into one table.
//!
//! Nested objects are expanded exactly [`MAX_DEPTH`] level deep as `parent.child`
//! columns. Anything below that, and every array, is kept as a single JSON cell.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::error::PokedexError;

pub const MAX_DEPTH: usize = 1;

/// One flattened record: column name to value, in the record's key order.
pub type FlatRow = IndexMap<String, Value>;

/// A table cell. `Missing` means the record never had this column, which is not the
/// same thing as a JSON `null` it did have.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Present(Value),
    Missing,
}

static MISSING: Cell = Cell::Missing;

impl Cell {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Cell::Present(value) => Some(value),
            Cell::Missing => None,
        }
    }

    /// `Missing` and JSON `null` both count as "no value".
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Missing | Cell::Present(Value::Null))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatTableRow {
    cells: IndexMap<String, Cell>,
}

impl FlatTableRow {
    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&MISSING)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: IndexSet<String>,
    rows: Vec<FlatTableRow>,
}

impl FlatTable {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn rows(&self) -> &[FlatTableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn flatten(record: &Value) -> Result<FlatRow, PokedexError> {
    flatten_at(record, 0)
}

fn flatten_at(record: &Value, index: usize) -> Result<FlatRow, PokedexError> {
    let object = record
        .as_object()
        .ok_or(PokedexError::InvalidRecord(index))?;

    let mut row = FlatRow::new();
    for (key, value) in object {
        expand(&mut row, key, value, 0);
    }
    Ok(row)
}

fn expand(row: &mut FlatRow, prefix: &str, value: &Value, depth: usize) {
    match value {
        Value::Object(children) if depth < MAX_DEPTH => {
            for (child, child_value) in children {
                expand(row, &format!("{prefix}.{child}"), child_value, depth + 1);
            }
        }
        _ => {
            row.insert(prefix.to_string(), value.clone());
        }
    }
}

pub fn build_table(records: &[Value]) -> Result<FlatTable, PokedexError> {
    let flat_rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| flatten_at(record, index))
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns = IndexSet::new();
    for row in &flat_rows {
        for column in row.keys() {
            if !columns.contains(column) {
                columns.insert(column.clone());
            }
        }
    }

    let rows = flat_rows
        .into_iter()
        .map(|mut row| FlatTableRow {
            cells: columns
                .iter()
                .map(|column| {
                    let cell = row
                        .shift_remove(column)
                        .map(Cell::Present)
                        .unwrap_or(Cell::Missing);
                    (column.clone(), cell)
                })
                .collect(),
        })
        .collect();

    Ok(FlatTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_objects_expand_one_level() {
        let row = flatten(&json!({
            "name": "bulbasaur",
            "sprites": {"front_default": "a.png", "other": {"home": {"front_default": "b.png"}}},
            "types": [{"slot": 1, "type": {"name": "grass"}}]
        }))
        .unwrap();

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(
            columns,
            vec!["name", "sprites.front_default", "sprites.other", "types"]
        );
        assert_eq!(row["sprites.other"], json!({"home": {"front_default": "b.png"}}));
        assert!(row["types"].is_array());
    }

    #[test]
    fn empty_object_contributes_no_columns() {
        let row = flatten(&json!({"name": "a", "past_abilities": {}})).unwrap();
        assert_eq!(row.len(), 1);
    }
}
