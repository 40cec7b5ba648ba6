//! Row-oriented tables, CSV/record ingest, and advisory schema inference.
//!
//! Cells are typed one at a time on ingest: integer, float, boolean
//! (`true/false/yes/no`, case-insensitive), otherwise text. Empty cells are
//! [`Cell::Null`]. The [`Schema`] is folded from a sample of rows and is
//! informational only: nothing downstream trusts it, and the aggregation
//! step coerces every value it reads.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

static NULL_CELL: Cell = Cell::Null;

impl Cell {
    /// Type a raw delimited-text field.
    pub fn parse(raw: &str) -> Cell {
        if raw.is_empty() {
            return Cell::Null;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::Float(f);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" => Cell::Bool(true),
            "false" | "no" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    /// Convert a JSON record value. Nested arrays/objects keep their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Cell {
        use serde_json::Value;
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Numeric value of this cell, or `NaN` when it has none.
    ///
    /// Text is parsed after trimming; booleans count as `1`/`0`; null is
    /// `NaN`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Null => f64::NAN,
            Cell::Bool(b) => f64::from(u8::from(*b)),
            Cell::Int(i) => *i as f64,
            Cell::Float(f) => *f,
            Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    /// The column type this cell votes for during schema inference.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Cell::Null => None,
            Cell::Bool(_) => Some(ColumnType::Bool),
            Cell::Int(_) => Some(ColumnType::Int),
            Cell::Float(_) => Some(ColumnType::Float),
            Cell::Text(_) => Some(ColumnType::String),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Null => write!(f, "null"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Declared scalar type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    String,
}

impl ColumnType {
    /// Fold two observed types into the narrowest type covering both.
    pub fn merge(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (String, _) | (_, String) => String,
            (Int, Float) | (Float, Int) => Float,
            _ => String,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::String => write!(f, "string"),
        }
    }
}

/// Ordered column name → type mapping. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
}

impl Schema {
    pub fn new(columns: Vec<(String, ColumnType)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> + '_ {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, ty) in &self.columns {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of column name to type")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, ty)) = access.next_entry::<String, ColumnType>()? {
                    columns.push((name, ty));
                }
                Ok(Schema { columns })
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

pub type Row = HashMap<String, Cell>;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("expected an array of row objects")]
    NotRecords,
    #[error("row {index} is not an object")]
    RowNotObject { index: usize },
}

/// A fully materialised row-oriented table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from rows alone; columns are the union of row keys,
    /// sorted for determinism.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns: Vec<String> = rows
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        Self { columns, rows }
    }

    /// Read delimited text with a header row.
    ///
    /// Short rows are padded with nulls; extra trailing fields are dropped.
    pub fn from_csv_reader<R: std::io::Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row: Row = columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), record.get(i).map(Cell::parse).unwrap_or(Cell::Null)))
                .collect();
            rows.push(row);
        }

        tracing::debug!(columns = columns.len(), rows = rows.len(), "table loaded");
        Ok(Self { columns, rows })
    }

    pub fn from_csv_path(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, TableError> {
        let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
        Self::from_csv_reader(file, delimiter)
    }

    /// Build a table from a JSON array of row objects.
    pub fn from_records(records: &serde_json::Value) -> Result<Self, TableError> {
        let array = records.as_array().ok_or(TableError::NotRecords)?;
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(array.len());

        for (index, record) in array.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or(TableError::RowNotObject { index })?;
            let mut row = Row::with_capacity(object.len());
            for (key, value) in object {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
                row.insert(key.clone(), Cell::from_json(value));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell at `(row, column)`; absent cells read as null.
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL_CELL)
    }

    /// Infer an advisory schema from the first `sample_rows` rows.
    ///
    /// Columns with no non-null sample are declared `string`.
    pub fn infer_schema(&self, sample_rows: usize) -> Schema {
        let columns = self
            .columns
            .iter()
            .map(|name| {
                let ty = self
                    .rows
                    .iter()
                    .take(sample_rows)
                    .filter_map(|row| row.get(name).and_then(Cell::column_type))
                    .reduce(ColumnType::merge)
                    .unwrap_or(ColumnType::String);
                (name.clone(), ty)
            })
            .collect();
        Schema::new(columns)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
