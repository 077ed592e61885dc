//! Column-ordered table shared by every sink.

use crate::records::RecordCollection;
use serde_json::{Map, Value};

/// Rows of JSON scalars under named columns.
///
/// Rows are always as wide as the column list; missing cells are `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl OutputTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// One row per record, columns in the category's field order. An empty
    /// collection still yields the category's columns.
    pub fn from_collection(collection: &RecordCollection) -> Self {
        let columns = collection
            .category()
            .columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut table = Self::new(columns);
        for record in collection.records() {
            table.push_named(record.flatten());
        }
        table
    }

    /// Build from JSON row objects. `None` if any element is not an object.
    pub fn from_json_rows(rows: Vec<Value>) -> Option<Self> {
        let mut table = Self::default();
        for row in rows {
            let Value::Object(map) = row else {
                return None;
            };
            table.push_named(map);
        }
        Some(table)
    }

    /// Append a row by column name. Unseen columns are added at the end and
    /// back-filled with `null` in earlier rows.
    pub fn push_named(&mut self, fields: impl IntoIterator<Item = (String, Value)>) {
        let mut row = vec![Value::Null; self.columns.len()];
        for (name, value) in fields {
            let index = match self.columns.iter().position(|c| *c == name) {
                Some(i) => i,
                None => {
                    self.columns.push(name);
                    for existing in &mut self.rows {
                        existing.push(Value::Null);
                    }
                    row.push(Value::Null);
                    self.columns.len() - 1
                }
            };
            row[index] = value;
        }
        self.rows.push(row);
    }

    /// Rows of `self` followed by rows of `other`, over the union of columns.
    pub fn concat(mut self, other: &OutputTable) -> OutputTable {
        for name in &other.columns {
            if !self.columns.contains(name) {
                self.columns.push(name.clone());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
            }
        }
        for row in &other.rows {
            self.push_named(other.columns.iter().cloned().zip(row.iter().cloned()));
        }
        self
    }

    /// Rows as JSON objects with keys in column order.
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let map: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(map)
            })
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Text form of a cell for text-only formats. `null` has none.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Category, Destination, EventRecord};
    use serde_json::json;

    fn event(name: &str) -> EventRecord {
        EventRecord {
            event_location: name.into(),
            town: "Oakham".into(),
            country: "UK".into(),
            postcode: "LE15 8AB".into(),
        }
    }

    #[test]
    fn test_from_collection() {
        let mut collection =
            RecordCollection::new(Category::Event, Destination::new("out", "opticron"));
        collection.push(event("Birdfair")).unwrap();
        collection.push(event("Spring Show")).unwrap();

        let table = OutputTable::from_collection(&collection);
        assert_eq!(table.columns(), Category::Event.columns());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], json!("Spring Show"));
    }

    #[test]
    fn test_empty_collection_keeps_columns() {
        let collection = RecordCollection::new(Category::Place, Destination::new("out", "x"));
        let table = OutputTable::from_collection(&collection);
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 7);
    }

    #[test]
    fn test_concat_unions_columns() {
        let old = OutputTable::from_json_rows(vec![json!({"A": "1", "B": "2"})]).unwrap();
        let new = OutputTable::from_json_rows(vec![json!({"B": "3", "C": "4"})]).unwrap();
        let merged = old.concat(&new);

        assert_eq!(merged.columns(), ["A", "B", "C"]);
        assert_eq!(
            merged.to_json_rows(),
            vec![
                json!({"A": "1", "B": "2", "C": null}),
                json!({"A": null, "B": "3", "C": "4"}),
            ]
        );
    }

    #[test]
    fn test_from_json_rows_rejects_scalars() {
        assert!(OutputTable::from_json_rows(vec![json!(1)]).is_none());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("LU1")), Some("LU1".to_string()));
        assert_eq!(cell_text(&json!(42)), Some("42".to_string()));
        assert_eq!(cell_text(&Value::Null), None);
    }
}
