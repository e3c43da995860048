use std::path::PathBuf;

use thiserror::Error;

/// Every failure a figure request can report.
///
/// An error aborts only the request that produced it; the batch driver keeps
/// going with the remaining figures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("trace file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("{}: line {line} has {found} fields, schema declares {expected}", path.display())]
    SchemaMismatch {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("{}: line {line}: {reason}", path.display())]
    MalformedTrace {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("axis mismatch for '{signal}': {reason}")]
    AxisMismatch { signal: String, reason: String },

    #[error("comparison '{metric}': member '{label}' has {found} points, expected {expected}")]
    LengthMismatch {
        metric: String,
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("comparison '{metric}': {reason}")]
    InvalidComparison { metric: String, reason: String },

    #[error("figure '{title}': {reason}")]
    InvalidFigure { title: String, reason: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("unsupported image format for {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("encoding {} failed", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest: {0}")]
    Manifest(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        Error::MalformedTrace {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
