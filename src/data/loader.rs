use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FieldValue, NUMERIC_COLUMNS, Observation, ObservationTable, REQUIRED_COLUMNS};

/// Cell spellings read as missing, the same set `pandas.read_csv` uses.
const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Non-finite floats carry no usable value.
fn float_field(v: f64) -> FieldValue {
    if v.is_finite() {
        FieldValue::Float(v)
    } else {
        FieldValue::Null
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an observation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per record
/// * `.json`    – `[{ "Year": 2018, "Season": "Spring", ... }, ...]`
/// * `.parquet` – flat scalar columns
///
/// The numeric columns are coerced after parsing and the filter/KPI columns
/// must be present.
pub fn load_file(path: &Path) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    for required in REQUIRED_COLUMNS {
        if !table.has_column(required) {
            bail!("{}: missing required column '{required}'", path.display());
        }
    }

    table.coerce_numeric(&NUMERIC_COLUMNS);
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every record as wide as the
/// header. Cell types are guessed per value.
fn load_csv(path: &Path) -> Result<ObservationTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let values = record.iter().map(guess_field_type).collect();
        rows.push(Observation::new(values));
    }

    Ok(ObservationTable::new(headers, rows))
}

fn guess_field_type(s: &str) -> FieldValue {
    if NA_VALUES.contains(&s.trim()) {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return float_field(f);
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return FieldValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    FieldValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year": 2018, "Season": "Spring", "Scientific_Name": "Turdus migratorius" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            let values = columns
                .iter()
                .map(|c| obj.get(c).map(json_to_field).unwrap_or(FieldValue::Null))
                .collect();
            Observation::new(values)
        })
        .collect();

    Ok(ObservationTable::new(columns, rows))
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                float_field(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of observations.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are rejected.
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let arrays = batch.columns();
        for row in 0..batch.num_rows() {
            let values = arrays
                .iter()
                .zip(&columns)
                .map(|(arr, name)| {
                    extract_field_value(arr, row)
                        .with_context(|| format!("Row {row}: failed to read '{name}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(Observation::new(values));
        }
    }

    Ok(ObservationTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_field_value(col: &Arc<dyn Array>, row: usize) -> Result<FieldValue> {
    if col.is_null(row) {
        return Ok(FieldValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => FieldValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => FieldValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => FieldValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => FieldValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => float_field(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_field(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => FieldValue::Bool(col.as_boolean().value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}
