use anyhow::Result;

use super::loader::load_csv_reader;
use super::model::Dataset;

/// Fisher's Iris measurements (150 rows, 4 numeric features + species).
const IRIS_CSV: &str = include_str!("../../assets/iris.csv");

/// The bundled sample dataset shown before anything is uploaded.
pub fn iris() -> Result<Dataset> {
    load_csv_reader(IRIS_CSV.as_bytes(), "Iris")
}
