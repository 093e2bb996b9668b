use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by records
/// * `.json`    – `[{ "col": value, ... }, ...]` (records-oriented)
/// * `.parquet` – any flat schema of numeric, string and boolean columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset")
        .to_string();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv_reader(file, &name)
        }
        "json" => load_json(path, &name),
        "parquet" | "pq" => load_parquet(path, &name),
        other => Err(DashboardError::UnsupportedFormat(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader. The first record is the header; column types
/// are inferred once all rows are read.
pub fn load_csv_reader<R: Read>(reader: R, name: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let raw_headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = dedupe_headers(&raw_headers);

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        // +2: one for the header line, one for 1-based numbering
        let record = result.with_context(|| format!("CSV row {}", row_no + 2))?;
        for (col_idx, field) in record.iter().enumerate() {
            cells[col_idx].push(CellValue::parse(field));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(h, values)| Column::new(h, values))
        .collect();
    Ok(Dataset::new(name, columns)?)
}

/// Blank headers become `Unnamed: {i}`; repeats get the first free `.1`, `.2`,
/// ... suffix, skipping names already taken by other headers.
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.clone()
            };
            let n = counts.entry(base.clone()).or_insert(0);
            let mut name = base.clone();
            while used.contains(&name) {
                *n += 1;
                name = format!("{base}.{n}");
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "sepal_length": 5.1, "species": "setosa" },
///   ...
/// ]
/// ```
///
/// `serde_json` maps keep their keys sorted, so columns come out in key
/// order within each record; keys missing from a record become nulls.
fn load_json(path: &Path, name: &str) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_records(&text, name)
}

pub fn parse_json_records(text: &str, name: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut order: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !order.contains(key) {
                order.push(key.clone());
            }
        }
    }

    let columns = order
        .iter()
        .map(|key| {
            let values = records
                .iter()
                .map(|rec| rec.get(key).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::new(key.clone(), values)
        })
        .collect();

    Ok(Dataset::new(name, columns)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table.
///
/// Integer and float columns become numeric, strings and booleans
/// categorical. Nested or exotic types are rendered as text.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, name: &str) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() != names.len() {
            bail!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                names.len()
            );
        }
        for (col_idx, array) in batch.columns().iter().enumerate() {
            append_arrow_column(array, &mut cells[col_idx]);
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(n, values)| Column::new(n, values))
        .collect();
    Ok(Dataset::new(name, columns)?)
}

// -- Arrow helpers --

macro_rules! push_primitive {
    ($col:expr, $out:expr, $ty:ty) => {{
        let arr = $col.as_primitive::<$ty>();
        for row in 0..arr.len() {
            $out.push(if arr.is_null(row) {
                CellValue::Null
            } else {
                CellValue::Number(arr.value(row) as f64)
            });
        }
    }};
}

/// Append every row of an Arrow column to `out`.
fn append_arrow_column(col: &Arc<dyn Array>, out: &mut Vec<CellValue>) {
    match col.data_type() {
        DataType::Int8 => push_primitive!(col, out, Int8Type),
        DataType::Int16 => push_primitive!(col, out, Int16Type),
        DataType::Int32 => push_primitive!(col, out, Int32Type),
        DataType::Int64 => push_primitive!(col, out, Int64Type),
        DataType::UInt8 => push_primitive!(col, out, UInt8Type),
        DataType::UInt16 => push_primitive!(col, out, UInt16Type),
        DataType::UInt32 => push_primitive!(col, out, UInt32Type),
        DataType::UInt64 => push_primitive!(col, out, UInt64Type),
        DataType::Float32 => push_primitive!(col, out, Float32Type),
        DataType::Float64 => push_primitive!(col, out, Float64Type),
        DataType::Utf8 => {
            let arr = col.as_string::<i32>();
            out.extend(arr.iter().map(|v| {
                v.map_or(CellValue::Null, |s| CellValue::Text(s.to_string()))
            }));
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            out.extend(arr.iter().map(|v| {
                v.map_or(CellValue::Null, |s| CellValue::Text(s.to_string()))
            }));
        }
        DataType::Boolean => {
            let arr = col.as_boolean();
            out.extend(arr.iter().map(|v| v.map_or(CellValue::Null, CellValue::Bool)));
        }
        other => {
            let label = format!("{other:?}");
            out.extend((0..col.len()).map(|row| {
                if col.is_null(row) {
                    CellValue::Null
                } else {
                    CellValue::Text(label.clone())
                }
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnKind;
    use std::io::Write;

    const CSV: &str = "\
id,score,group,flag
1,2.5,a,true
2,,b,false
3,4.0,a,true
";

    #[test]
    fn csv_infers_column_kinds() {
        let ds = load_csv_reader(CSV.as_bytes(), "t.csv").unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names(), vec!["id", "score", "group", "flag"]);
        assert_eq!(ds.numeric_columns(), vec!["id", "score"]);
        assert_eq!(ds.categorical_columns(), vec!["group", "flag"]);
        assert_eq!(ds.columns[1].values[1], CellValue::Null);
    }

    #[test]
    fn csv_ragged_row_is_an_error() {
        let err = load_csv_reader("a,b\n1,2\n3\n".as_bytes(), "bad.csv").unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 3"), "{err:#}");
    }

    #[test]
    fn csv_header_only_gives_empty_dataset() {
        let ds = load_csv_reader("a,b\n".as_bytes(), "empty.csv").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let ds = load_csv_reader("x,x,\n1,2,3\n".as_bytes(), "d.csv").unwrap();
        assert_eq!(ds.column_names(), vec!["x", "x.1", "Unnamed: 2"]);
    }

    #[test]
    fn renamed_duplicate_skips_existing_header() {
        let ds = load_csv_reader("x,x.1,x\n1,2,3\n".as_bytes(), "d.csv").unwrap();
        assert_eq!(ds.column_names(), vec!["x", "x.1", "x.2"]);
        assert_eq!(ds.column("x.1").unwrap().values[0], CellValue::Number(2.0));
        assert_eq!(ds.column("x.2").unwrap().values[0], CellValue::Number(3.0));

        let ds = load_csv_reader("x,x,x.1\n1,2,3\n".as_bytes(), "d.csv").unwrap();
        assert_eq!(ds.column_names(), vec!["x", "x.1", "x.1.1"]);
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let ds = parse_json_records(
            r#"[{"a": 1, "b": "x"}, {"a": 2.5}, {"b": "y", "c": true}]"#,
            "j.json",
        )
        .unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b", "c"]);
        assert_eq!(ds.column("a").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(ds.column("a").unwrap().values[2], CellValue::Null);
        assert_eq!(ds.column("c").unwrap().kind, ColumnKind::Categorical);
    }

    #[test]
    fn json_rejects_non_array_root() {
        assert!(parse_json_records(r#"{"a": 1}"#, "j.json").is_err());
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.CSV");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(CSV.as_bytes()).unwrap();
        drop(f);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.name, "data.CSV");
        assert_eq!(ds.len(), 3);

        let other = dir.path().join("data.xlsx");
        std::fs::write(&other, b"").unwrap();
        let err = load_file(&other).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DashboardError>(),
            Some(&DashboardError::UnsupportedFormat("xlsx".into()))
        );
    }

    #[test]
    fn parquet_columns_map_to_cells() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("n", DataType::Int64, false),
            Field::new("v", DataType::Float64, true),
            Field::new("s", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![Some(0.5), None])),
                Arc::new(StringArray::from(vec![Some("a"), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.column_names(), vec!["n", "v", "s"]);
        assert_eq!(ds.numeric_columns(), vec!["n", "v"]);
        assert_eq!(ds.column("v").unwrap().values[1], CellValue::Null);
        assert_eq!(
            ds.column("s").unwrap().values[0],
            CellValue::Text("a".into())
        );
    }
}
