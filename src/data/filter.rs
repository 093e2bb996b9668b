use std::collections::BTreeSet;

use super::model::{CellValue, Dataset};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Filter predicate: which values of one categorical column are selected
// ---------------------------------------------------------------------------

/// Row filter over a single categorical column (`isin` semantics).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFilter {
    pub column: String,
    /// All distinct values of the column, in first-appearance order.
    pub options: Vec<CellValue>,
    pub selected: BTreeSet<CellValue>,
}

impl CategoryFilter {
    /// A filter on `column` with every value selected (i.e., show everything).
    pub fn new(dataset: &Dataset, column: &str) -> Result<Self, DashboardError> {
        let options = dataset.unique_values(column)?;
        let selected = options.iter().cloned().collect();
        Ok(CategoryFilter {
            column: column.to_string(),
            options,
            selected,
        })
    }

    pub fn is_selected(&self, value: &CellValue) -> bool {
        self.selected.contains(value)
    }

    /// Toggle a single value in the selection.
    pub fn toggle(&mut self, value: &CellValue) {
        if !self.selected.remove(value) {
            self.selected.insert(value.clone());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.options.iter().cloned().collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }
}

/// Return indices of rows that pass the filter.
///
/// * No filter → every row
/// * Unknown column → every row
/// * Otherwise → rows whose value is in the selected set; an empty
///   selection keeps nothing
pub fn filtered_indices(dataset: &Dataset, filter: Option<&CategoryFilter>) -> Vec<usize> {
    let Some(filter) = filter else {
        return (0..dataset.len()).collect();
    };
    let Some(col) = dataset.column(&filter.column) else {
        return (0..dataset.len()).collect();
    };
    col.values
        .iter()
        .enumerate()
        .filter(|(_, v)| filter.selected.contains(*v))
        .map(|(i, _)| i)
        .collect()
}
