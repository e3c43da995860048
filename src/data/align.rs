use serde::{Deserialize, Serialize};

use super::model::Series;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Axis – how step numbers map onto the plotted x axis
// ---------------------------------------------------------------------------

/// Shared x-axis of a figure.
///
/// `Rescale` turns step numbers into real time: `real = multiplier * step + offset`,
/// e.g. steps 0..9 becoming 0, 30, ..., 270.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Axis {
    /// Native index: step counter, or the explicit index field.
    #[default]
    Step,
    Rescale {
        multiplier: f64,
        #[serde(default)]
        offset: f64,
        #[serde(default)]
        unit: Option<String>,
    },
}

impl Axis {
    pub fn rescale(multiplier: f64, offset: f64) -> Self {
        Axis::Rescale {
            multiplier,
            offset,
            unit: None,
        }
    }

    /// Attach a unit name (only meaningful for rescaled axes).
    pub fn with_unit(self, unit: impl Into<String>) -> Self {
        match self {
            Axis::Rescale {
                multiplier, offset, ..
            } => Axis::Rescale {
                multiplier,
                offset,
                unit: Some(unit.into()),
            },
            Axis::Step => Axis::Step,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Axis::Step => None,
            Axis::Rescale { unit, .. } => unit.as_deref(),
        }
    }

    /// Real-axis value of a step number.
    pub fn map(&self, step: f64) -> f64 {
        match self {
            Axis::Step => step,
            Axis::Rescale {
                multiplier, offset, ..
            } => multiplier * step + offset,
        }
    }
}

// ---------------------------------------------------------------------------
// AlignedSeries
// ---------------------------------------------------------------------------

/// A series whose index has been resolved onto a figure axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    series: Series,
    axis: Axis,
    x: Vec<f64>,
}

impl AlignedSeries {
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn name(&self) -> &str {
        self.series.name()
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Aligned index values.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn values(&self) -> &[f64] {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.series.values().iter().copied())
    }

    /// Same axis, new values; used by derived series such as interval widths.
    pub(crate) fn with_values(&self, name: &str, values: Vec<f64>) -> AlignedSeries {
        let series = self.series.with_values(name, values);
        AlignedSeries {
            series,
            axis: self.axis.clone(),
            x: self.x.clone(),
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.series.truncate(len);
        self.x.truncate(len);
    }
}

/// Resolve `series` onto `axis`.
///
/// * Step-indexed series: position `i` (row number `s`) maps to `m*s + o`.
/// * Explicit-index series: `Step` and the identity rescale keep the native
///   index. Other rescales accept an index that already equals `m*i + o`, or
///   one that is just the step counter; anything else is an axis mismatch.
pub fn align(series: Series, axis: &Axis) -> Result<AlignedSeries> {
    let x = match axis {
        Axis::Step => series.index().to_vec(),
        Axis::Rescale {
            multiplier, offset, ..
        } => {
            let (m, o) = (*multiplier, *offset);
            if !m.is_finite() || m == 0.0 || !o.is_finite() {
                return Err(Error::AxisMismatch {
                    signal: series.name().to_string(),
                    reason: format!("invalid rescale multiplier {m} / offset {o}"),
                });
            }
            if series.is_explicit() {
                rescale_explicit(&series, m, o)?
            } else {
                series.index().iter().map(|&s| m * s + o).collect()
            }
        }
    };

    Ok(AlignedSeries {
        series,
        axis: axis.clone(),
        x,
    })
}

fn rescale_explicit(series: &Series, m: f64, o: f64) -> Result<Vec<f64>> {
    let index = series.index();
    if m == 1.0 && o == 0.0 {
        return Ok(index.to_vec());
    }
    let follows = |f: &dyn Fn(f64) -> f64| {
        index
            .iter()
            .enumerate()
            .all(|(i, &v)| close(v, f(i as f64)))
    };
    if follows(&|i| m * i + o) {
        return Ok(index.to_vec());
    }
    if follows(&|i| i) {
        return Ok((0..index.len()).map(|i| m * i as f64 + o).collect());
    }

    let spacing = if index.len() > 1 { index[1] - index[0] } else { f64::NAN };
    Err(Error::AxisMismatch {
        signal: series.name().to_string(),
        reason: format!(
            "native {} spacing {spacing} disagrees with multiplier {m} (offset {o})",
            series.kind()
        ),
    })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_axis_is_identity() {
        let s = Series::from_values("v", vec![3.0, 4.0, 5.0]);
        let a = align(s.clone(), &Axis::Step).unwrap();
        assert_eq!(a.x(), s.index());
        assert_eq!(a.values(), s.values());
    }

    #[test]
    fn rescale_maps_steps_to_real_time() {
        let s = Series::from_values("v", vec![0.0; 10]);
        let a = align(s, &Axis::rescale(30.0, 0.0)).unwrap();
        assert_eq!(a.x()[9], 270.0);
    }

    #[test]
    fn windowed_series_keeps_source_step_numbers() {
        let s = Series::from_values("d", vec![1.0; 1000]).window(550..1000);
        let a = align(s, &Axis::rescale(1.0, 0.0)).unwrap();
        assert_eq!(a.x()[0], 550.0);
        assert_eq!(a.len(), 450);
    }

    #[test]
    fn explicit_index_passes_through_when_consistent() {
        let idx: Vec<f64> = (0..5).map(|i| 50.0 * i as f64).collect();
        let s = Series::with_index("v", "t", idx.clone(), vec![1.0; 5]).unwrap();
        let a = align(s, &Axis::rescale(50.0, 0.0)).unwrap();
        assert_eq!(a.x(), idx.as_slice());
    }

    #[test]
    fn explicit_step_counter_is_rescaled() {
        let s = Series::with_index("v", "t", vec![0.0, 1.0, 2.0], vec![1.0; 3]).unwrap();
        let a = align(s, &Axis::rescale(10.0, 5.0)).unwrap();
        assert_eq!(a.x(), &[5.0, 15.0, 25.0]);
    }

    #[test]
    fn explicit_index_with_other_spacing_is_rejected() {
        let s = Series::with_index("v", "t", vec![0.0, 10.0, 20.0], vec![1.0; 3]).unwrap();
        let err = align(s, &Axis::rescale(30.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::AxisMismatch { .. }));
    }

    #[test]
    fn zero_multiplier_is_rejected() {
        let s = Series::from_values("v", vec![1.0]);
        assert!(align(s, &Axis::rescale(0.0, 1.0)).is_err());
    }
}
