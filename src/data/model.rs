use std::collections::HashSet;
use std::fmt;

use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a key in `BTreeSet` / `HashSet` downstream, so it must be `Ord` and `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Number(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

/// Tokens read as missing values, the same set pandas treats as NaN by default.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl CellValue {
    /// Interpret the value as an `f64`; only numbers qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Parse a raw text field (CSV cell) into the narrowest matching value.
    pub fn parse(raw: &str) -> Self {
        if NA_TOKENS.contains(&raw) {
            return CellValue::Null;
        }
        if let Ok(v) = raw.trim().parse::<f64>() {
            return CellValue::Number(v);
        }
        match raw {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Text(raw.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-null cell is a number.
    Numeric,
    /// Anything else: text, booleans or a mix.
    Categorical,
}

impl ColumnKind {
    pub fn infer(values: &[CellValue]) -> Self {
        let all_numbers = values
            .iter()
            .all(|v| matches!(v, CellValue::Number(_) | CellValue::Null));
        if all_numbers {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column and infer its kind from the values.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = ColumnKind::infer(&values);
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Per-row numeric view; nulls and NaN map to `None`.
    pub fn numbers(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().map(CellValue::as_f64)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Column-oriented in-memory table. All columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Display name (file name or "Iris").
    pub name: String,
    pub columns: Vec<Column>,
}

impl Dataset {
    /// Assemble a dataset, checking that every column has the same length.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, DashboardError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(DashboardError::ColumnLength {
                    column: bad.name.clone(),
                    expected,
                    found: bad.len(),
                });
            }
        }
        Ok(Dataset {
            name: name.into(),
            columns,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// A dataset is empty when it has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.len() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Names of non-numeric columns, in table order.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Look up a numeric column by name.
    pub fn numeric_column(&self, name: &str) -> Result<&Column, DashboardError> {
        let col = self
            .column(name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))?;
        if !col.is_numeric() {
            return Err(DashboardError::NotNumeric(name.to_string()));
        }
        Ok(col)
    }

    /// Distinct values of a column in order of first appearance.
    pub fn unique_values(&self, name: &str) -> Result<Vec<CellValue>, DashboardError> {
        let col = self
            .column(name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))?;
        let mut seen = HashSet::new();
        Ok(col
            .values
            .iter()
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect())
    }

    /// Schema-preserving row subset. Out-of-range indices are skipped.
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: indices
                    .iter()
                    .filter_map(|&i| c.values.get(i).cloned())
                    .collect(),
            })
            .collect();
        Dataset {
            name: self.name.clone(),
            columns,
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let indices: Vec<usize> = (0..self.len().min(n)).collect();
        self.take_rows(&indices)
    }

    /// Check the dataset can drive the dashboard at all.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.is_empty() {
            return Err(DashboardError::EmptyDataset);
        }
        if self.numeric_columns().is_empty() {
            return Err(DashboardError::NoNumericColumns);
        }
        Ok(())
    }
}
