//! Writes `sample_data.csv` and `sample_data.parquet`: a synthetic table
//! large enough to trip the dashboard's row cap.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const ROWS: usize = 20_000;

struct Table {
    id: Vec<i64>,
    temperature: Vec<f64>,
    pressure: Vec<f64>,
    yield_pct: Vec<f64>,
    line: Vec<String>,
    shift: Vec<String>,
}

fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> Result<f64> {
    Ok(Normal::new(mean, std_dev)?.sample(rng))
}

fn generate(rng: &mut StdRng) -> Result<Table> {
    let lines = ["Line_A", "Line_B", "Line_C"];
    let shifts = ["day", "night"];

    let mut t = Table {
        id: Vec::with_capacity(ROWS),
        temperature: Vec::with_capacity(ROWS),
        pressure: Vec::with_capacity(ROWS),
        yield_pct: Vec::with_capacity(ROWS),
        line: Vec::with_capacity(ROWS),
        shift: Vec::with_capacity(ROWS),
    };

    for i in 0..ROWS {
        let line_idx = rng.gen_range(0..lines.len());
        let shift_idx = rng.gen_range(0..shifts.len());
        let offset = line_idx as f64 * 5.0;

        let temperature = gauss(rng, 70.0 + offset, 4.0)?;
        let pressure = gauss(rng, 1.2, 0.1)? + 0.01 * (temperature - 70.0);
        let yield_pct = (80.0 + 0.6 * (temperature - 70.0) - 8.0 * (pressure - 1.2)
            + gauss(rng, 0.0, 2.0)?)
        .clamp(0.0, 100.0);

        t.id.push(i as i64);
        t.temperature.push(temperature);
        t.pressure.push(pressure);
        t.yield_pct.push(yield_pct);
        t.line.push(lines[line_idx].to_string());
        t.shift.push(shifts[shift_idx].to_string());
    }
    Ok(t)
}

fn write_csv(path: &str, t: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["id", "temperature", "pressure", "yield", "line", "shift"])?;
    for i in 0..t.id.len() {
        writer.write_record([
            t.id[i].to_string(),
            format!("{:.3}", t.temperature[i]),
            format!("{:.4}", t.pressure[i]),
            format!("{:.2}", t.yield_pct[i]),
            t.line[i].clone(),
            t.shift[i].clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(t: &Table) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("pressure", DataType::Float64, false),
        Field::new("yield", DataType::Float64, false),
        Field::new("line", DataType::Utf8, false),
        Field::new("shift", DataType::Utf8, false),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(t.id.clone())),
            Arc::new(Float64Array::from(t.temperature.clone())),
            Arc::new(Float64Array::from(t.pressure.clone())),
            Arc::new(Float64Array::from(t.yield_pct.clone())),
            Arc::new(StringArray::from(t.line.clone())),
            Arc::new(StringArray::from(t.shift.clone())),
        ],
    )
    .context("building record batch")
}

fn write_parquet(path: &str, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let table = generate(&mut rng)?;

    write_csv("sample_data.csv", &table)?;
    let batch = to_batch(&table)?;
    write_parquet("sample_data.parquet", &batch)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!("Wrote {ROWS} rows to sample_data.csv and sample_data.parquet");
    Ok(())
}
