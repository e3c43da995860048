use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::data::align::AlignedSeries;
use crate::data::compare::ComparisonSet;

// ---------------------------------------------------------------------------
// Per-entry style
// ---------------------------------------------------------------------------

/// How samples are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    #[default]
    Line,
    /// Discrete points, e.g. per-step robustness evaluations.
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Circle,
    Cross,
    Triangle,
}

/// Which y axis an entry is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    #[default]
    Primary,
    /// Twin axis on the right-hand side sharing the x axis.
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub mark: Mark,
    /// `None` takes the next palette colour.
    pub color: Option<Rgb>,
    pub line: LineStyle,
    pub marker: Option<Marker>,
    pub axis: YAxis,
}

impl Style {
    pub fn scatter() -> Self {
        Style {
            mark: Mark::Scatter,
            marker: Some(Marker::Circle),
            ..Style::default()
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_line(mut self, line: LineStyle) -> Self {
        self.line = line;
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn on_secondary(mut self) -> Self {
        self.axis = YAxis::Secondary;
        self
    }
}

// ---------------------------------------------------------------------------
// Figure-level options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    /// Corner overlapping the fewest data points.
    #[default]
    Best,
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

/// A resolved legend placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl LegendPosition {
    pub fn corner(self) -> Option<Corner> {
        match self {
            LegendPosition::Best => None,
            LegendPosition::UpperRight => Some(Corner::UpperRight),
            LegendPosition::UpperLeft => Some(Corner::UpperLeft),
            LegendPosition::LowerLeft => Some(Corner::LowerLeft),
            LegendPosition::LowerRight => Some(Corner::LowerRight),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YScale {
    #[default]
    Linear,
    /// Base-10 logarithmic primary axis; data must be positive.
    Log,
}

/// Replacement x ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickMap {
    /// Explicit `(position, label)` pairs.
    Explicit(Vec<(f64, String)>),
    /// Positions `0..count`, labeled `multiplier * i + offset`.
    Generated {
        count: usize,
        multiplier: f64,
        #[serde(default)]
        offset: f64,
    },
}

impl TickMap {
    pub fn ticks(&self) -> Vec<(f64, String)> {
        match self {
            TickMap::Explicit(pairs) => pairs.clone(),
            TickMap::Generated {
                count,
                multiplier,
                offset,
            } => (0..*count)
                .map(|i| {
                    let i = i as f64;
                    (i, format_number(multiplier * i + offset))
                })
                .collect(),
        }
    }
}

/// Shortest readable rendering of a tick value: `450`, `0.5`, `1.25e-7`.
pub(crate) fn format_number(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else if v != 0.0 && (v.abs() < 1e-3 || v.abs() >= 1e6) {
        format!("{v:.2e}")
    } else {
        let s = format!("{v:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One thing to plot.
#[derive(Debug, Clone)]
pub enum PlotEntry {
    Series {
        label: String,
        series: AlignedSeries,
        style: Style,
    },
    /// Every member becomes its own trace; `styles[i]` styles member `i`
    /// (missing styles default).
    Comparison {
        set: ComparisonSet,
        styles: Vec<Style>,
    },
    /// Positional pair drawn against the shared time axis in 3-D.
    Trajectory {
        label: String,
        x: AlignedSeries,
        y: AlignedSeries,
        style: Style,
    },
    /// `y` values plotted against `x` values.
    Parametric {
        label: String,
        x: AlignedSeries,
        y: AlignedSeries,
        style: Style,
    },
}

impl PlotEntry {
    pub fn series(label: impl Into<String>, series: AlignedSeries, style: Style) -> Self {
        PlotEntry::Series {
            label: label.into(),
            series,
            style,
        }
    }

    pub fn comparison(set: ComparisonSet) -> Self {
        PlotEntry::Comparison {
            set,
            styles: Vec::new(),
        }
    }

    pub fn trajectory(label: impl Into<String>, x: AlignedSeries, y: AlignedSeries, style: Style) -> Self {
        PlotEntry::Trajectory {
            label: label.into(),
            x,
            y,
            style,
        }
    }

    pub fn parametric(label: impl Into<String>, x: AlignedSeries, y: AlignedSeries, style: Style) -> Self {
        PlotEntry::Parametric {
            label: label.into(),
            x,
            y,
            style,
        }
    }

    pub(crate) fn is_3d(&self) -> bool {
        matches!(self, PlotEntry::Trajectory { .. })
    }
}

// ---------------------------------------------------------------------------
// FigureSpec
// ---------------------------------------------------------------------------

pub const DEFAULT_SIZE: (u32, u32) = (800, 600);

/// Everything needed to compose one figure.
#[derive(Debug, Clone)]
pub struct FigureSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y2_label: Option<String>,
    pub legend: LegendPosition,
    pub y_scale: YScale,
    pub ticks: Option<TickMap>,
    /// Width and height in pixels.
    pub size: (u32, u32),
    pub entries: Vec<PlotEntry>,
    /// Artifact file name, e.g. `protein_comparison.png`.
    pub output: String,
}

impl FigureSpec {
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            y2_label: None,
            legend: LegendPosition::default(),
            y_scale: YScale::default(),
            ticks: None,
            size: DEFAULT_SIZE,
            entries: Vec::new(),
            output: output.into(),
        }
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn secondary_label(mut self, y2: impl Into<String>) -> Self {
        self.y2_label = Some(y2.into());
        self
    }

    pub fn legend(mut self, position: LegendPosition) -> Self {
        self.legend = position;
        self
    }

    pub fn y_scale(mut self, scale: YScale) -> Self {
        self.y_scale = scale;
        self
    }

    pub fn ticks(mut self, ticks: TickMap) -> Self {
        self.ticks = Some(ticks);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn entry(mut self, entry: PlotEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ticks_relabel_steps() {
        let ticks = TickMap::Generated {
            count: 10,
            multiplier: 50.0,
            offset: 0.0,
        }
        .ticks();
        assert_eq!(ticks.len(), 10);
        assert_eq!(ticks[0], (0.0, "0".to_string()));
        assert_eq!(ticks[9], (9.0, "450".to_string()));
    }

    #[test]
    fn tick_map_deserializes_both_forms() {
        let explicit: TickMap = serde_json::from_str(r#"[[0, "a"], [1.5, "b"]]"#).unwrap();
        assert_eq!(explicit.ticks()[1], (1.5, "b".to_string()));
        let generated: TickMap =
            serde_json::from_str(r#"{"count": 3, "multiplier": 30}"#).unwrap();
        assert_eq!(generated.ticks()[2].1, "60");
    }

    #[test]
    fn numbers_format_compactly() {
        assert_eq!(format_number(270.0), "270");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1.5e-7), "1.50e-7");
    }

    #[test]
    fn style_deserializes_with_defaults() {
        let style: Style = serde_json::from_str(r#"{"color": "orange", "line": "dashed"}"#).unwrap();
        assert_eq!(style.mark, Mark::Line);
        assert_eq!(style.line, LineStyle::Dashed);
        assert_eq!(style.axis, YAxis::Primary);
        assert_eq!(style.color, Some(Rgb(255, 165, 0)));
    }
}
