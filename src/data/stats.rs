use super::align::AlignedSeries;
use crate::error::{Error, Result};

/// Max and mean of a series' finite samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub max: f64,
    pub mean: f64,
    pub len: usize,
}

/// Summarize the finite values; `None` when there are none.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    Some(Summary {
        max,
        mean,
        len: finite.len(),
    })
}

/// Pointwise `|lower - upper|` of two confidence-interval bounds.
pub fn interval_width(lower: &AlignedSeries, upper: &AlignedSeries, name: &str) -> Result<AlignedSeries> {
    if lower.len() != upper.len() {
        return Err(Error::LengthMismatch {
            metric: name.to_string(),
            label: upper.name().to_string(),
            expected: lower.len(),
            found: upper.len(),
        });
    }
    if lower.axis() != upper.axis() || lower.x() != upper.x() {
        return Err(Error::AxisMismatch {
            signal: name.to_string(),
            reason: format!(
                "bounds '{}' and '{}' are not on the same axis",
                lower.name(),
                upper.name()
            ),
        });
    }
    let width = lower
        .values()
        .iter()
        .zip(upper.values())
        .map(|(l, u)| (l - u).abs())
        .collect();
    Ok(lower.with_values(name, width))
}
