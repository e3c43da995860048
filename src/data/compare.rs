use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::align::{align, AlignedSeries, Axis};
use super::loader;
use super::model::TraceSchema;
use crate::error::{Error, Result};

/// What to do when members of a comparison differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    #[default]
    FailOnMismatch,
    TruncateToShortest,
}

/// One scenario run feeding a comparison: display label, trace file, layout.
#[derive(Debug, Clone)]
pub struct Source {
    pub label: String,
    pub path: PathBuf,
    pub schema: TraceSchema,
}

impl Source {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, schema: TraceSchema) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            schema,
        }
    }
}

/// Series of one metric that differ by a single parameter, in caller order.
///
/// All members share the same axis and the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSet {
    metric: String,
    members: Vec<(String, AlignedSeries)>,
}

impl ComparisonSet {
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn members(&self) -> &[(String, AlignedSeries)] {
        &self.members
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|(label, _)| label.as_str())
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Common length of every member.
    pub fn series_len(&self) -> usize {
        self.members.first().map(|(_, s)| s.len()).unwrap_or(0)
    }

    pub fn axis(&self) -> Option<&Axis> {
        self.members.first().map(|(_, s)| s.axis())
    }

    pub fn into_members(self) -> Vec<(String, AlignedSeries)> {
        self.members
    }
}

/// Bundle labeled series of `metric` into a [`ComparisonSet`].
pub fn build<I, S>(named_series: I, metric: &str, policy: LengthPolicy) -> Result<ComparisonSet>
where
    I: IntoIterator<Item = (S, AlignedSeries)>,
    S: Into<String>,
{
    let mut members: Vec<(String, AlignedSeries)> = named_series
        .into_iter()
        .map(|(label, series)| (label.into(), series))
        .collect();

    let invalid = |reason: String| Error::InvalidComparison {
        metric: metric.to_string(),
        reason,
    };

    let Some((first_label, first)) = members.first() else {
        return Err(invalid("no series given".into()));
    };

    let mut seen = BTreeSet::new();
    for (label, _) in &members {
        if !seen.insert(label.as_str()) {
            return Err(invalid(format!("duplicate label '{label}'")));
        }
    }

    let axis = first.axis().clone();
    for (label, series) in &members[1..] {
        if *series.axis() != axis {
            return Err(Error::AxisMismatch {
                signal: label.clone(),
                reason: format!(
                    "axis {:?} differs from {:?} used by '{first_label}'",
                    series.axis(),
                    axis
                ),
            });
        }
    }

    let expected = first.len();
    match policy {
        LengthPolicy::FailOnMismatch => {
            if let Some((label, series)) = members.iter().find(|(_, s)| s.len() != expected) {
                return Err(Error::LengthMismatch {
                    metric: metric.to_string(),
                    label: label.clone(),
                    expected,
                    found: series.len(),
                });
            }
        }
        LengthPolicy::TruncateToShortest => {
            let shortest = members.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
            if members.iter().any(|(_, s)| s.len() != shortest) {
                log::debug!("Truncating comparison '{metric}' to {shortest} points");
            }
            for (_, series) in &mut members {
                series.truncate(shortest);
            }
        }
    }

    Ok(ComparisonSet {
        metric: metric.to_string(),
        members,
    })
}

/// Load, align and bundle a list of scenario sources.
pub fn from_sources(
    metric: &str,
    sources: &[Source],
    axis: &Axis,
    policy: LengthPolicy,
) -> Result<ComparisonSet> {
    let named = sources
        .iter()
        .map(|src| {
            let series = loader::load(&src.path, &src.schema)?;
            Ok((src.label.clone(), align(series, axis)?))
        })
        .collect::<Result<Vec<_>>>()?;
    build(named, metric, policy)
}
