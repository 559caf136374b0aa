//! In-memory result frames
//!
//! A [`ResultFrame`] is the tabular value a read operation returns: rows of
//! named, typed columns. Frames are produced at the client boundary and
//! passed through the drivers verbatim; nothing in this workspace mutates
//! or validates their contents after construction.

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// A single cell value in a result frame
///
/// Warehouse-native values are converted to this representation once, at
/// the client boundary. Temporal values are carried as their warehouse
/// string rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value (any warehouse integer width)
    Int(i64),

    /// Floating point value
    Float(f64),

    /// Text value (also dates, timestamps and decimals rendered as text)
    Text(String),

    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    /// Whether this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Json(v) => write!(f, "{}", v),
        }
    }
}

/// A tabular read result: rows of named, typed columns
///
/// Each row has exactly one value per schema column, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFrame {
    /// Column names and types
    pub schema: Schema,

    /// Row values, one `Vec<Value>` per row in schema column order
    pub rows: Vec<Vec<Value>>,
}

impl ResultFrame {
    /// Create an empty frame with the given schema
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Create a frame from a schema and rows
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.schema.columns.len()
    }

    /// (rows, columns) shape
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    /// All values of one column, by name
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.columns.iter().position(|c| c.name == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// A copy of this frame truncated to at most `limit` rows
    pub fn head(&self, limit: usize) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, LogicalType};

    fn sample_frame() -> ResultFrame {
        ResultFrame::new(
            Schema::from_columns(vec![
                Column::new("id", LogicalType::Int),
                Column::new("name", LogicalType::String),
            ]),
            vec![
                vec![Value::Int(1), Value::Text("alice".to_string())],
                vec![Value::Int(2), Value::Text("bob".to_string())],
                vec![Value::Int(3), Value::Null],
            ],
        )
    }

    #[test]
    fn frame_shape() {
        let frame = sample_frame();
        assert_eq!(frame.shape(), (3, 2));
        assert_eq!(frame.num_rows(), 3);
        assert_eq!(frame.num_columns(), 2);
    }

    #[test]
    fn empty_frame() {
        let frame = ResultFrame::empty(Schema::from_columns(vec![
            Column::new("id", LogicalType::Int),
        ]));
        assert_eq!(frame.shape(), (0, 1));
    }

    #[test]
    fn column_values_by_name() {
        let frame = sample_frame();

        let ids = frame.column_values("id").unwrap();
        assert_eq!(ids, vec![&Value::Int(1), &Value::Int(2), &Value::Int(3)]);

        assert!(frame.column_values("missing").is_none());
    }

    #[test]
    fn head_truncates() {
        let frame = sample_frame();

        let sample = frame.head(2);
        assert_eq!(sample.num_rows(), 2);
        assert_eq!(sample.schema, frame.schema);

        // Limit beyond length keeps everything
        assert_eq!(frame.head(10).num_rows(), 3);
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Text("x".to_string()).to_string(), "x");
        assert!(Value::Null.is_null());
        assert!(!Value::Int(0).is_null());
    }
}
