use thiserror::Error;

/// Domain errors surfaced to the user in the dashboard.
///
/// I/O and parse failures travel as `anyhow::Error` with context attached;
/// these variants cover conditions the UI reacts to specifically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("Dataset is empty.")]
    EmptyDataset,

    #[error("No numeric columns available for plotting.")]
    NoNumericColumns,

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Column '{column}' has {found} values but the dataset has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
}
