//! Load simulation trace files, line them up on a common axis and compose
//! comparison figures.
//!
//! ```text
//!   loader ──▶ align ──▶ compare ──▶ compose ──▶ export
//!   (Series)  (AlignedSeries) (ComparisonSet) (ComposedFigure) (image file)
//! ```
//!
//! [`batch`] drives the pipeline from a JSON [`manifest`].

pub mod batch;
pub mod color;
pub mod data;
pub mod error;
pub mod figure;
pub mod manifest;

pub use error::{Error, Result};
