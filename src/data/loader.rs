use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{RawRecord, Series, TraceSchema, TraceTable};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the schema's value field of one trace file as a [`Series`].
///
/// The index comes from the schema's index field when one is declared
/// (it must be strictly increasing), otherwise from the row counter.
pub fn load(path: &Path, schema: &TraceSchema) -> Result<Series> {
    load_table(path, schema)?.default_series()
}

/// Parse every record of a trace file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – declared fields select numeric columns by name
/// * anything else      – header-less delimited text, fields in declared order
pub fn load_table(path: &Path, schema: &TraceSchema) -> Result<TraceTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path, schema)?,
        _ => read_delimited(path, schema)?,
    };

    log::debug!(
        "Loaded {} records of {:?} from {}",
        records.len(),
        schema.fields(),
        path.display()
    );
    Ok(TraceTable::new(path, schema.clone(), records))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingInput {
            path: path.to_path_buf(),
        },
        _ => Error::io(path, e),
    })
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Rows are one record per line with the schema's field count.  Blank lines
/// and lines starting with `#` are skipped; fields are trimmed.
fn read_delimited(path: &Path, schema: &TraceSchema) -> Result<Vec<RawRecord>> {
    let file = open(path)?;
    match schema.delimiter().as_byte() {
        Some(delimiter) => read_csv(path, schema, file, delimiter),
        None => read_whitespace(path, schema, file),
    }
}

fn read_csv(path: &Path, schema: &TraceSchema, file: File, delimiter: u8) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(BufReader::new(file));

    let mut records = Vec::new();
    let mut seen = 0usize;
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        seen += 1;
        if seen <= schema.skip_rows() {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(seen as u64);
        records.push(parse_fields(path, schema, line, record.iter())?);
    }
    Ok(records)
}

fn read_whitespace(path: &Path, schema: &TraceSchema, file: File) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut seen = 0usize;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        seen += 1;
        if seen <= schema.skip_rows() {
            continue;
        }
        records.push(parse_fields(path, schema, i as u64 + 1, text.split_whitespace())?);
    }
    Ok(records)
}

fn parse_fields<'a>(
    path: &Path,
    schema: &TraceSchema,
    line: u64,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<RawRecord> {
    let tokens: Vec<&str> = tokens.collect();
    let expected = schema.fields().len();
    if tokens.len() != expected {
        return Err(Error::SchemaMismatch {
            path: path.to_path_buf(),
            line,
            expected,
            found: tokens.len(),
        });
    }

    let values = tokens
        .iter()
        .zip(schema.fields())
        .map(|(tok, name)| {
            tok.parse::<f64>().map_err(|_| {
                Error::malformed(path, line, format!("field '{name}': '{tok}' is not a number"))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(RawRecord::new(line, values))
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::io(path, source),
        other => Error::malformed(path, line, format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Declared fields are looked up by column name; every declared column must
/// exist and hold Float64, Float32, Int64 or Int32 values without nulls.
fn read_parquet(path: &Path, schema: &TraceSchema) -> Result<Vec<RawRecord>> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::malformed(path, 0, format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| Error::malformed(path, 0, format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();
    let mut row_no: u64 = 0;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| {
            Error::malformed(path, row_no + 1, format!("reading parquet record batch: {e}"))
        })?;
        let batch_schema = batch.schema();

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
        for name in schema.fields() {
            let idx = batch_schema.index_of(name).map_err(|_| Error::SchemaMismatch {
                path: path.to_path_buf(),
                line: row_no + 1,
                expected: schema.fields().len(),
                found: schema
                    .fields()
                    .iter()
                    .filter(|f| batch_schema.index_of(f).is_ok())
                    .count(),
            })?;
            columns.push(batch.column(idx).clone());
        }

        for row in 0..batch.num_rows() {
            row_no += 1;
            if row_no as usize <= schema.skip_rows() {
                continue;
            }
            let values = columns
                .iter()
                .zip(schema.fields())
                .map(|(col, name)| {
                    numeric_cell(col, row).ok_or_else(|| {
                        Error::malformed(
                            path,
                            row_no,
                            format!("field '{name}' is null or of type {:?}", col.data_type()),
                        )
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            records.push(RawRecord::new(row_no, values));
        }
    }

    Ok(records)
}

/// Read one numeric cell as `f64`.
fn numeric_cell(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        _ => None,
    }
}
