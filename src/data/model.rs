use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{Result, ViewerError};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, fixed per column by the loader's type inference.
/// Used as a `BTreeSet` key downstream so it must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Text(_) => 4,
        }
    }

    /// Interpret the value as an `f64` for range predicates and statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Same variant, ignoring the payload.
    pub fn same_type(&self, other: &CellValue) -> bool {
        self.rank() == other.rank()
    }

    /// Raw text for delimited export; `Null` becomes an empty field.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

// -- Manual Eq/Ord so CellValue can live in a BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded sheet
// ---------------------------------------------------------------------------

/// Column-named rows. Column names are unique and every row has exactly one
/// value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ViewerError::DuplicateColumn(name.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ViewerError::RowWidth {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column in row order.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Copy the given rows, in the order given, into a new table.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// Column descriptors (derived, never stored with the table)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

/// Summary of a single column, recomputed whenever the table changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// Sorted distinct non-null values.
    pub distinct: BTreeSet<CellValue>,
    /// `(min, max)` over non-null values, numeric columns only.
    pub range: Option<(f64, f64)>,
    /// Non-null values span more than one variant.
    pub mixed_types: bool,
}

impl ColumnDescriptor {
    pub fn describe(table: &Table, idx: usize) -> Self {
        let distinct: BTreeSet<CellValue> = table
            .column_values(idx)
            .filter(|v| !v.is_null())
            .cloned()
            .collect();

        let mixed_types = match distinct.first() {
            Some(first) => distinct.iter().any(|v| !v.same_type(first)),
            None => false,
        };

        let kind = if !distinct.is_empty() && distinct.iter().all(CellValue::is_numeric) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };

        let range = match kind {
            ColumnKind::Numeric => distinct
                .iter()
                .filter_map(CellValue::as_f64)
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                    None => Some((v, v)),
                }),
            ColumnKind::Categorical => None,
        };

        ColumnDescriptor {
            name: table.columns[idx].clone(),
            kind,
            unique_count: distinct.len(),
            distinct,
            range,
            mixed_types,
        }
    }

    /// Describe every column, in column order.
    pub fn describe_all(table: &Table) -> Vec<Self> {
        (0..table.width())
            .map(|idx| Self::describe(table, idx))
            .collect()
    }
}
