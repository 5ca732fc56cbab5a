//! Device status table built from the daemon's column-major poll result.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// Column name → cells, in the order the daemon reported them.
pub type StatusColumns = IndexMap<String, Vec<Value>>;

/// Row-major device table ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStatusTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DeviceStatusTable {
    /// Transpose column-major data into rows.
    ///
    /// All columns must have the same length; a ragged response is rejected
    /// rather than padded or truncated.
    pub fn from_columns(columns: &StatusColumns) -> Result<Self, AppError> {
        let names: Vec<String> = columns.keys().cloned().collect();
        let row_count = columns.values().next().map(Vec::len).unwrap_or(0);

        if let Some((name, cells)) = columns.iter().find(|(_, cells)| cells.len() != row_count) {
            return Err(AppError::MalformedResponse(format!(
                "device status column '{name}' has {} cells, expected {row_count}",
                cells.len()
            )));
        }

        let rows = (0..row_count)
            .map(|i| columns.values().map(|cells| cell_text(&cells[i])).collect())
            .collect();

        Ok(Self {
            columns: names,
            rows,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(pairs: &[(&str, Vec<Value>)]) -> StatusColumns {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_transposes_columns_into_rows() {
        let cols = columns(&[
            ("name", vec![json!("steamdeck"), json!("nas")]),
            ("status", vec![json!("-"), json!("offline")]),
        ]);
        let table = DeviceStatusTable::from_columns(&cols).unwrap();
        assert_eq!(table.columns, vec!["name", "status"]);
        assert_eq!(
            table.rows,
            vec![vec!["steamdeck", "-"], vec!["nas", "offline"]]
        );
    }

    #[test]
    fn test_preserves_reported_column_order() {
        let cols = columns(&[
            ("status", vec![json!("active")]),
            ("name", vec![json!("laptop")]),
        ]);
        let table = DeviceStatusTable::from_columns(&cols).unwrap();
        assert_eq!(table.columns, vec!["status", "name"]);
        assert_eq!(table.rows, vec![vec!["active", "laptop"]]);
    }

    #[test]
    fn test_ragged_columns_are_rejected() {
        let cols = columns(&[
            ("name", vec![json!("a"), json!("b")]),
            ("status", vec![json!("-")]),
        ]);
        let err = DeviceStatusTable::from_columns(&cols).unwrap_err();
        assert_eq!(err.kind(), "MalformedResponse");
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_empty_result_gives_empty_table() {
        let table = DeviceStatusTable::from_columns(&StatusColumns::new()).unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_non_string_cells_are_rendered() {
        let cols = columns(&[("name", vec![json!(null)]), ("rx", vec![json!(1024)])]);
        let table = DeviceStatusTable::from_columns(&cols).unwrap();
        assert_eq!(table.rows, vec![vec!["".to_string(), "1024".to_string()]]);
    }
}
