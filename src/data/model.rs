use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// TraceSchema – the declared layout of a header-less trace file
// ---------------------------------------------------------------------------

/// Field separator of a delimited trace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    /// Any run of spaces or tabs (numpy `genfromtxt` default).
    Whitespace,
}

impl Delimiter {
    /// Single-byte separator for the csv reader; `None` for whitespace splitting.
    pub fn as_byte(self) -> Option<u8> {
        match self {
            Delimiter::Comma => Some(b','),
            Delimiter::Semicolon => Some(b';'),
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Whitespace => None,
        }
    }
}

/// Declared field layout of a trace file.
///
/// Trace files carry no header, so the caller names every column up front.
/// The schema is validated on construction: names are unique and non-empty,
/// and the index/value fields (when set) are among the declared names.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSchema {
    fields: Vec<String>,
    index_field: Option<String>,
    value_field: Option<String>,
    delimiter: Delimiter,
    skip_rows: usize,
}

impl TraceSchema {
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::InvalidSchema("no fields declared".into()));
        }
        let mut seen = BTreeSet::new();
        for name in &fields {
            if name.trim().is_empty() {
                return Err(Error::InvalidSchema("empty field name".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidSchema(format!("duplicate field '{name}'")));
            }
        }
        Ok(Self {
            fields,
            index_field: None,
            value_field: None,
            delimiter: Delimiter::default(),
            skip_rows: 0,
        })
    }

    /// Use `field` as the explicit series index.
    pub fn with_index(mut self, field: &str) -> Result<Self> {
        self.require(field)?;
        if self.value_field.as_deref() == Some(field) {
            return Err(Error::InvalidSchema(format!(
                "'{field}' cannot be both index and value field"
            )));
        }
        self.index_field = Some(field.to_string());
        Ok(self)
    }

    /// Use `field` as the plotted value when loading a single series.
    pub fn with_value(mut self, field: &str) -> Result<Self> {
        self.require(field)?;
        if self.index_field.as_deref() == Some(field) {
            return Err(Error::InvalidSchema(format!(
                "'{field}' cannot be both index and value field"
            )));
        }
        self.value_field = Some(field.to_string());
        Ok(self)
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn index_field(&self) -> Option<&str> {
        self.index_field.as_deref()
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn skip_rows(&self) -> usize {
        self.skip_rows
    }

    /// Position of a declared field.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// The value field: the declared one, else the last non-index field.
    pub fn value_field(&self) -> Option<&str> {
        if let Some(v) = &self.value_field {
            return Some(v);
        }
        self.fields
            .iter()
            .rev()
            .find(|f| Some(f.as_str()) != self.index_field.as_deref())
            .map(|f| f.as_str())
    }

    fn require(&self, field: &str) -> Result<()> {
        if self.position(field).is_none() {
            return Err(Error::InvalidSchema(format!(
                "'{field}' is not one of the declared fields {:?}",
                self.fields
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RawRecord / TraceTable – parsed rows of one file
// ---------------------------------------------------------------------------

/// One parsed row, positionally bound to its table's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source file.
    pub line: u64,
    values: Vec<f64>,
}

impl RawRecord {
    pub fn new(line: u64, values: Vec<f64>) -> Self {
        Self { line, values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, position: usize) -> Option<f64> {
        self.values.get(position).copied()
    }
}

/// All records of one trace file together with the schema that named them.
#[derive(Debug, Clone)]
pub struct TraceTable {
    path: PathBuf,
    schema: TraceSchema,
    records: Vec<RawRecord>,
}

impl TraceTable {
    pub fn new(path: &Path, schema: TraceSchema, records: Vec<RawRecord>) -> Self {
        Self {
            path: path.to_path_buf(),
            schema,
            records,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &TraceSchema {
        &self.schema
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value of `field` in record `row`.
    pub fn value(&self, row: usize, field: &str) -> Option<f64> {
        let pos = self.schema.position(field)?;
        self.records.get(row)?.get(pos)
    }

    /// All values of one declared field, in row order.
    pub fn column(&self, field: &str) -> Option<Vec<f64>> {
        let pos = self.schema.position(field)?;
        self.records.iter().map(|r| r.get(pos)).collect()
    }

    /// The series named by the schema's value field.
    pub fn default_series(&self) -> Result<Series> {
        let field = self
            .schema
            .value_field()
            .ok_or_else(|| Error::InvalidSchema("schema has no value field".into()))?
            .to_string();
        self.series(&field)
    }

    /// Build the series for `field`, indexed by the schema's index field if
    /// one is declared, else by the row counter.
    pub fn series(&self, field: &str) -> Result<Series> {
        let values = self.column(field).ok_or_else(|| {
            Error::InvalidSchema(format!("'{field}' is not a declared field"))
        })?;

        let Some(index_field) = self.schema.index_field() else {
            return Ok(Series::from_values(field, values));
        };
        if index_field == field {
            return Err(Error::InvalidSchema(format!(
                "'{field}' is the index field"
            )));
        }

        let index = self.column(index_field).unwrap_or_default();
        if let Some(row) = first_non_increasing(&index) {
            let line = self.records[row].line;
            return Err(Error::malformed(
                &self.path,
                line,
                format!(
                    "index field '{index_field}' is not strictly increasing ({} after {})",
                    index[row],
                    index[row - 1]
                ),
            ));
        }
        Series::with_index(field, index_field, index, values)
    }
}

// ---------------------------------------------------------------------------
// Series – one named signal over an index
// ---------------------------------------------------------------------------

/// Where a series' index values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKind {
    /// Row counter: the index is the step number of each row.
    Step,
    /// Values of a declared index field.
    Field(String),
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Step => write!(f, "step"),
            IndexKind::Field(name) => write!(f, "field '{name}'"),
        }
    }
}

/// Ordered `(index, value)` pairs of one signal.
///
/// The index is strictly increasing. For [`IndexKind::Step`] series the index
/// holds the row number of each sample in its source file, which stays true
/// after [`Series::window`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    kind: IndexKind,
    index: Vec<f64>,
    values: Vec<f64>,
}

impl Series {
    /// A series indexed by the step counter `0..N-1`.
    pub fn from_values(name: impl Into<String>, values: Vec<f64>) -> Self {
        let index = (0..values.len()).map(|i| i as f64).collect();
        Self {
            name: name.into(),
            kind: IndexKind::Step,
            index,
            values,
        }
    }

    /// A series with an explicit index drawn from `index_field`.
    pub fn with_index(
        name: impl Into<String>,
        index_field: impl Into<String>,
        index: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if index.len() != values.len() {
            return Err(Error::AxisMismatch {
                signal: name,
                reason: format!("{} index values for {} samples", index.len(), values.len()),
            });
        }
        if let Some(i) = first_non_increasing(&index) {
            return Err(Error::AxisMismatch {
                signal: name,
                reason: format!("index is not strictly increasing at position {i}"),
            });
        }
        Ok(Self {
            name,
            kind: IndexKind::Field(index_field.into()),
            index,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &IndexKind {
        &self.kind
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self.kind, IndexKind::Field(_))
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Rename the signal (used for display labels).
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Positions `range` of the series, clamped to its length like a slice
    /// expression `data[start:end]`. Index values are preserved.
    pub fn window(&self, range: Range<usize>) -> Series {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Series {
            name: self.name.clone(),
            kind: self.kind.clone(),
            index: self.index[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }

    /// Same index, different samples. `values` must match the current length.
    pub(crate) fn with_values(&self, name: &str, values: Vec<f64>) -> Series {
        debug_assert_eq!(values.len(), self.values.len());
        Series {
            name: name.to_string(),
            kind: self.kind.clone(),
            index: self.index.clone(),
            values,
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.index.truncate(len);
        self.values.truncate(len);
    }
}

/// Position of the first index value that does not exceed its predecessor.
pub(crate) fn first_non_increasing(index: &[f64]) -> Option<usize> {
    index
        .windows(2)
        .position(|w| !(w[1] > w[0]))
        .map(|i| i + 1)
}
