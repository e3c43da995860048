use std::ops::Range;

use crate::color::{generate_palette, Rgb};
use crate::data::align::{AlignedSeries, Axis};
use crate::error::{Error, Result};

use super::spec::{
    format_number, Corner, FigureSpec, LineStyle, Mark, Marker, PlotEntry, Style, YAxis, YScale,
};

// ---------------------------------------------------------------------------
// ComposedFigure – resolved, backend-independent figure model
// ---------------------------------------------------------------------------

/// One drawable 2-D trace with every style decision resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: String,
    /// Plot coordinates (log10 already applied on a log axis).
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub mark: Mark,
    pub line: LineStyle,
    pub marker: Option<Marker>,
    pub axis: YAxis,
}

/// One 3-D path of `(t, x, y)` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Path3d {
    pub label: String,
    pub points: Vec<(f64, f64, f64)>,
    pub color: Rgb,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub mark: Mark,
    pub line: LineStyle,
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planar {
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    /// Present when any trace uses the secondary axis.
    pub y2_range: Option<Range<f64>>,
    pub y_scale: YScale,
    /// Replacement x ticks; `None` keeps automatic ticks.
    pub ticks: Option<Vec<(f64, String)>>,
    pub traces: Vec<Trace>,
}

impl Planar {
    /// Tick label for a primary-axis plot coordinate.
    pub fn y_tick_label(&self, v: f64) -> String {
        match self.y_scale {
            YScale::Linear => format_number(v),
            YScale::Log => format_number(10f64.powf(v)),
        }
    }

    pub fn secondary(&self) -> impl Iterator<Item = &Trace> + '_ {
        self.traces.iter().filter(|t| t.axis == YAxis::Secondary)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    pub t_range: Range<f64>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub paths: Vec<Path3d>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    Planar(Planar),
    Trajectory3d(Space),
}

/// In-memory figure produced by [`compose`]; pure data, no I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y2_label: Option<String>,
    pub size: (u32, u32),
    pub legend: Vec<LegendEntry>,
    pub legend_position: Corner,
    pub plot: Plot,
    pub output: String,
}

impl ComposedFigure {
    /// Number of plotted series (2-D traces or 3-D paths).
    pub fn series_count(&self) -> usize {
        match &self.plot {
            Plot::Planar(p) => p.traces.len(),
            Plot::Trajectory3d(s) => s.paths.len(),
        }
    }

    pub fn legend_labels(&self) -> Vec<&str> {
        self.legend.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn planar(&self) -> Option<&Planar> {
        match &self.plot {
            Plot::Planar(p) => Some(p),
            Plot::Trajectory3d(_) => None,
        }
    }

    pub fn space(&self) -> Option<&Space> {
        match &self.plot {
            Plot::Planar(_) => None,
            Plot::Trajectory3d(s) => Some(s),
        }
    }
}

// ---------------------------------------------------------------------------
// compose
// ---------------------------------------------------------------------------

/// Resolve a [`FigureSpec`] into a [`ComposedFigure`].
///
/// Colours left unset are taken from an evenly spaced palette sized to the
/// number of drawn series, in entry order.
pub fn compose(spec: FigureSpec) -> Result<ComposedFigure> {
    let invalid = |reason: String| Error::InvalidFigure {
        title: spec.title.clone(),
        reason,
    };

    if spec.entries.is_empty() {
        return Err(invalid("no entries to plot".into()));
    }
    let three_d = spec.entries.iter().filter(|e| e.is_3d()).count();
    if three_d > 0 && three_d < spec.entries.len() {
        return Err(invalid("3-D trajectories cannot share a figure with 2-D entries".into()));
    }

    shared_time_axis(&spec.entries)?;

    let drawn: usize = spec
        .entries
        .iter()
        .map(|e| match e {
            PlotEntry::Comparison { set, .. } => set.len(),
            _ => 1,
        })
        .sum();
    let palette = generate_palette(drawn);
    let mut slot = 0usize;
    let mut next_color = |style: &Style| {
        let color = style
            .color
            .unwrap_or_else(|| palette.get(slot).copied().unwrap_or(Rgb::GRAY));
        slot += 1;
        color
    };

    let mut legend = Vec::with_capacity(drawn);

    let plot = if three_d > 0 {
        let mut paths = Vec::with_capacity(drawn);
        for entry in &spec.entries {
            if let PlotEntry::Trajectory { label, x, y, style } = entry {
                let color = next_color(style);
                let points = trajectory_points(label, x, y).map_err(&invalid)?;
                legend.push(legend_entry(label, color, style));
                paths.push(Path3d {
                    label: label.clone(),
                    points,
                    color,
                    line: style.line,
                });
            }
        }
        Plot::Trajectory3d(space(paths))
    } else {
        let mut traces = Vec::with_capacity(drawn);
        for entry in &spec.entries {
            match entry {
                PlotEntry::Series {
                    label,
                    series,
                    style,
                } => {
                    let color = next_color(style);
                    traces.push(trace(label, series.points().collect(), style, color));
                }
                PlotEntry::Comparison { set, styles } => {
                    for (i, (label, series)) in set.members().iter().enumerate() {
                        let style = styles.get(i).copied().unwrap_or_default();
                        let color = next_color(&style);
                        traces.push(trace(label, series.points().collect(), &style, color));
                    }
                }
                PlotEntry::Parametric { label, x, y, style } => {
                    if x.len() != y.len() {
                        return Err(invalid(format!(
                            "parametric '{label}': x has {} points, y has {}",
                            x.len(),
                            y.len()
                        )));
                    }
                    let points = x
                        .values()
                        .iter()
                        .copied()
                        .zip(y.values().iter().copied())
                        .collect();
                    let color = next_color(style);
                    traces.push(trace(label, points, style, color));
                }
                PlotEntry::Trajectory { .. } => {}
            }
        }
        for t in &traces {
            legend.push(LegendEntry {
                label: t.label.clone(),
                color: t.color,
                mark: t.mark,
                line: t.line,
                marker: t.marker,
            });
        }
        if spec.y_scale == YScale::Log {
            to_log10(&mut traces).map_err(&invalid)?;
        }
        let ticks = spec.ticks.as_ref().map(|t| t.ticks());
        Plot::Planar(planar(traces, spec.y_scale, ticks))
    };

    check_ranges(&plot).map_err(&invalid)?;

    let legend_position = match spec.legend.corner() {
        Some(corner) => corner,
        None => best_corner(&plot),
    };

    let figure = ComposedFigure {
        title: spec.title,
        x_label: spec.x_label,
        y_label: spec.y_label,
        y2_label: spec.y2_label,
        size: spec.size,
        legend,
        legend_position,
        plot,
        output: spec.output,
    };
    log::debug!(
        "Composed '{}': {} series, legend {:?}",
        figure.title,
        figure.series_count(),
        figure.legend_position
    );
    Ok(figure)
}

/// Every entry plotted against time must use the same axis mapping and unit.
/// Parametric entries plot values against values and are exempt.
fn shared_time_axis(entries: &[PlotEntry]) -> Result<()> {
    let mut first: Option<(&str, &Axis)> = None;
    for entry in entries {
        let (label, axis) = match entry {
            PlotEntry::Series { label, series, .. } => (label.as_str(), series.axis()),
            PlotEntry::Comparison { set, .. } => match set.axis() {
                Some(axis) => (set.metric(), axis),
                None => continue,
            },
            PlotEntry::Trajectory { label, x, .. } => (label.as_str(), x.axis()),
            PlotEntry::Parametric { .. } => continue,
        };
        match first {
            None => first = Some((label, axis)),
            Some((first_label, expected)) if expected != axis => {
                return Err(Error::AxisMismatch {
                    signal: label.to_string(),
                    reason: format!(
                        "time axis {axis:?} ({}) differs from {expected:?} ({}) used by '{first_label}'",
                        axis.unit().unwrap_or("no unit"),
                        expected.unit().unwrap_or("no unit"),
                    ),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn trace(label: &str, points: Vec<(f64, f64)>, style: &Style, color: Rgb) -> Trace {
    Trace {
        label: label.to_string(),
        points,
        color,
        mark: style.mark,
        line: style.line,
        marker: match style.mark {
            Mark::Scatter => Some(style.marker.unwrap_or(Marker::Circle)),
            Mark::Line => style.marker,
        },
        axis: style.axis,
    }
}

fn legend_entry(label: &str, color: Rgb, style: &Style) -> LegendEntry {
    LegendEntry {
        label: label.to_string(),
        color,
        mark: style.mark,
        line: style.line,
        marker: style.marker,
    }
}

fn trajectory_points(
    label: &str,
    x: &AlignedSeries,
    y: &AlignedSeries,
) -> std::result::Result<Vec<(f64, f64, f64)>, String> {
    if x.len() != y.len() {
        return Err(format!(
            "trajectory '{label}': x has {} points, y has {}",
            x.len(),
            y.len()
        ));
    }
    if x.x() != y.x() {
        return Err(format!("trajectory '{label}': x and y are not on the same time axis"));
    }
    Ok(x.points()
        .zip(y.values().iter().copied())
        .map(|((t, xv), yv)| (t, xv, yv))
        .collect())
}

fn to_log10(traces: &mut [Trace]) -> std::result::Result<(), String> {
    for t in traces.iter_mut().filter(|t| t.axis == YAxis::Primary) {
        if let Some(&(_, v)) = t.points.iter().find(|p| p.1.is_finite() && p.1 <= 0.0) {
            return Err(format!(
                "log scale needs positive values, '{}' contains {v}",
                t.label
            ));
        }
        for p in &mut t.points {
            p.1 = p.1.log10();
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Finite min/max of `values`; `None` when there are none.
fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Range widened by `margin` of its span; degenerate extents get a unit span.
///
/// The half-span is computed without overflow and the ends are clamped to
/// finite values, so a finite extent always yields a finite range.
fn padded(extent: Option<(f64, f64)>, margin: f64) -> Range<f64> {
    let clamp = |v: f64| v.clamp(f64::MIN, f64::MAX);
    match extent {
        None => 0.0..1.0,
        Some((lo, hi)) => {
            let half_span = hi / 2.0 - lo / 2.0;
            if half_span <= f64::EPSILON * hi.abs().max(1.0) / 2.0 {
                clamp(lo - 0.5)..clamp(hi + 0.5)
            } else {
                let pad = half_span * (2.0 * margin);
                clamp(lo - pad)..clamp(hi + pad)
            }
        }
    }
}

/// A range the backend can subdivide into ticks.
fn drawable(name: &str, r: &Range<f64>) -> std::result::Result<(), String> {
    if (r.end - r.start).is_finite() {
        Ok(())
    } else {
        Err(format!(
            "{name} range {}..{} is too wide to draw",
            r.start, r.end
        ))
    }
}

fn check_ranges(plot: &Plot) -> std::result::Result<(), String> {
    match plot {
        Plot::Planar(p) => {
            drawable("x", &p.x_range)?;
            drawable("y", &p.y_range)?;
            match &p.y2_range {
                Some(r) => drawable("secondary y", r),
                None => Ok(()),
            }
        }
        Plot::Trajectory3d(s) => {
            drawable("time", &s.t_range)?;
            drawable("x", &s.x_range)?;
            drawable("y", &s.y_range)
        }
    }
}

fn y_extent(traces: &[Trace], axis: YAxis) -> Option<(f64, f64)> {
    extent(
        traces
            .iter()
            .filter(|t| t.axis == axis)
            .flat_map(|t| t.points.iter().map(|p| p.1)),
    )
}

fn planar(traces: Vec<Trace>, y_scale: YScale, ticks: Option<Vec<(f64, String)>>) -> Planar {
    let xs = traces.iter().flat_map(|t| t.points.iter().map(|p| p.0));
    let tick_xs = ticks.iter().flatten().map(|(v, _)| *v);
    let x_range = padded(extent(xs.chain(tick_xs)), 0.0);

    let y_range = padded(y_extent(&traces, YAxis::Primary), 0.05);
    let has_secondary = traces.iter().any(|t| t.axis == YAxis::Secondary);
    let y2_range = has_secondary.then(|| padded(y_extent(&traces, YAxis::Secondary), 0.05));

    Planar {
        x_range,
        y_range,
        y2_range,
        y_scale,
        ticks,
        traces,
    }
}

fn space(paths: Vec<Path3d>) -> Space {
    let coord = |f: fn(&(f64, f64, f64)) -> f64| {
        padded(extent(paths.iter().flat_map(|p| p.points.iter().map(f))), 0.05)
    };
    Space {
        t_range: coord(|p| p.0),
        x_range: coord(|p| p.1),
        y_range: coord(|p| p.2),
        paths,
    }
}

// ---------------------------------------------------------------------------
// Legend placement
// ---------------------------------------------------------------------------

/// Corner whose third-of-the-plot box covers the fewest samples; ties go
/// to the earlier corner in upper-right, upper-left, lower-left, lower-right.
fn best_corner(plot: &Plot) -> Corner {
    const ORDER: [Corner; 4] = [
        Corner::UpperRight,
        Corner::UpperLeft,
        Corner::LowerLeft,
        Corner::LowerRight,
    ];

    let Plot::Planar(p) = plot else {
        return Corner::UpperRight;
    };

    let unit = |v: f64, r: &Range<f64>| (v - r.start) / (r.end - r.start);
    let mut counts = [0usize; 4];
    for t in &p.traces {
        let y_range = match (t.axis, &p.y2_range) {
            (YAxis::Secondary, Some(r)) => r,
            _ => &p.y_range,
        };
        for &(x, y) in &t.points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let (u, v) = (unit(x, &p.x_range), unit(y, y_range));
            let left = u <= 1.0 / 3.0;
            let right = u >= 2.0 / 3.0;
            let low = v <= 1.0 / 3.0;
            let high = v >= 2.0 / 3.0;
            for (i, corner) in ORDER.iter().enumerate() {
                let hit = match corner {
                    Corner::UpperRight => high && right,
                    Corner::UpperLeft => high && left,
                    Corner::LowerLeft => low && left,
                    Corner::LowerRight => low && right,
                };
                if hit {
                    counts[i] += 1;
                }
            }
        }
    }

    let mut best = 0;
    for i in 1..ORDER.len() {
        if counts[i] < counts[best] {
            best = i;
        }
    }
    ORDER[best]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::align::{align, Axis};
    use crate::data::compare::{build, LengthPolicy};
    use crate::data::model::Series;
    use crate::figure::spec::{LegendPosition, TickMap};

    fn aligned(values: Vec<f64>) -> AlignedSeries {
        align(Series::from_values("v", values), &Axis::Step).unwrap()
    }

    #[test]
    fn legend_follows_entry_order_and_palette_fills_colors() {
        let spec = FigureSpec::new("t", "t.png")
            .entry(PlotEntry::series("b", aligned(vec![1.0, 2.0]), Style::default()))
            .entry(PlotEntry::series(
                "a",
                aligned(vec![3.0, 4.0]),
                Style::default().with_color(Rgb(1, 2, 3)),
            ));
        let fig = compose(spec).unwrap();
        assert_eq!(fig.legend_labels(), ["b", "a"]);
        assert_eq!(fig.legend[0].color, generate_palette(2)[0]);
        assert_eq!(fig.legend[1].color, Rgb(1, 2, 3));
        assert_eq!(fig.series_count(), 2);
    }

    #[test]
    fn ranges_cover_data() {
        let spec = FigureSpec::new("t", "t.png")
            .entry(PlotEntry::series("a", aligned(vec![0.0, 10.0, f64::NAN]), Style::default()));
        let p = compose(spec).unwrap().planar().unwrap().clone();
        assert_eq!(p.x_range, 0.0..2.0);
        assert!(p.y_range.start < 0.0 && p.y_range.end > 10.0);
        assert!(p.y2_range.is_none());
    }

    #[test]
    fn secondary_axis_gets_its_own_range() {
        let spec = FigureSpec::new("t", "t.png")
            .entry(PlotEntry::series("a", aligned(vec![0.0, 1.0]), Style::default()))
            .entry(PlotEntry::series(
                "b",
                aligned(vec![100.0, 300.0]),
                Style::scatter().on_secondary(),
            ));
        let fig = compose(spec).unwrap();
        let p = fig.planar().unwrap();
        let y2 = p.y2_range.clone().unwrap();
        assert!(y2.start < 100.0 && y2.end > 300.0);
        assert!(p.y_range.end < 2.0);
        assert_eq!(p.secondary().count(), 1);
        assert_eq!(p.traces[1].marker, Some(Marker::Circle));
    }

    #[test]
    fn best_legend_avoids_crowded_corner() {
        // Rising line: crowds lower-left and upper-right.
        let spec = FigureSpec::new("t", "t.png").entry(PlotEntry::series(
            "up",
            aligned((0..30).map(f64::from).collect()),
            Style::default(),
        ));
        assert_eq!(compose(spec).unwrap().legend_position, Corner::UpperLeft);

        let spec = FigureSpec::new("t", "t.png")
            .legend(LegendPosition::LowerRight)
            .entry(PlotEntry::series("x", aligned(vec![1.0]), Style::default()));
        assert_eq!(compose(spec).unwrap().legend_position, Corner::LowerRight);
    }

    #[test]
    fn comparison_members_become_traces() {
        let set = build(
            [("0.3", aligned(vec![1.0; 4])), ("0.4", aligned(vec![2.0; 4]))],
            "m",
            LengthPolicy::default(),
        )
        .unwrap();
        let fig = compose(FigureSpec::new("t", "t.png").entry(PlotEntry::comparison(set))).unwrap();
        assert_eq!(fig.legend_labels(), ["0.3", "0.4"]);
        assert_ne!(fig.legend[0].color, fig.legend[1].color);
    }

    #[test]
    fn log_scale_transforms_and_rejects_non_positive() {
        let spec = FigureSpec::new("t", "t.png")
            .y_scale(YScale::Log)
            .entry(PlotEntry::series("a", aligned(vec![1.0, 100.0]), Style::default()));
        let fig = compose(spec).unwrap();
        let p = fig.planar().unwrap();
        assert_eq!(p.traces[0].points[1].1, 2.0);
        assert_eq!(p.y_tick_label(2.0), "100");

        let spec = FigureSpec::new("t", "t.png")
            .y_scale(YScale::Log)
            .entry(PlotEntry::series("a", aligned(vec![1.0, 0.0]), Style::default()));
        assert!(matches!(compose(spec), Err(Error::InvalidFigure { .. })));
    }

    #[test]
    fn tick_map_is_resolved() {
        let spec = FigureSpec::new("t", "t.png")
            .ticks(TickMap::Generated {
                count: 10,
                multiplier: 50.0,
                offset: 0.0,
            })
            .entry(PlotEntry::series("a", aligned(vec![1.0; 10]), Style::default()));
        let fig = compose(spec).unwrap();
        let ticks = fig.planar().unwrap().ticks.clone().unwrap();
        assert_eq!(ticks[9], (9.0, "450".to_string()));
    }

    #[test]
    fn trajectories_compose_in_3d() {
        let x = aligned(vec![0.0, 1.0, 2.0]);
        let y = aligned(vec![5.0, 5.0, 6.0]);
        let spec = FigureSpec::new("overtake", "o.png")
            .entry(PlotEntry::trajectory("other", x.clone(), y.clone(), Style::default()))
            .entry(PlotEntry::trajectory("controlled", y, x, Style::default()));
        let fig = compose(spec).unwrap();
        let s = fig.space().unwrap();
        assert_eq!(s.paths.len(), 2);
        assert_eq!(s.paths[0].points[2], (2.0, 2.0, 6.0));
        assert_eq!(fig.legend_labels(), ["other", "controlled"]);
    }

    #[test]
    fn structural_errors() {
        assert!(compose(FigureSpec::new("empty", "e.png")).is_err());

        let mixed = FigureSpec::new("m", "m.png")
            .entry(PlotEntry::series("a", aligned(vec![1.0]), Style::default()))
            .entry(PlotEntry::trajectory(
                "b",
                aligned(vec![1.0]),
                aligned(vec![1.0]),
                Style::default(),
            ));
        assert!(matches!(compose(mixed), Err(Error::InvalidFigure { .. })));

        let ragged = FigureSpec::new("r", "r.png").entry(PlotEntry::trajectory(
            "b",
            aligned(vec![1.0, 2.0]),
            aligned(vec![1.0]),
            Style::default(),
        ));
        assert!(compose(ragged).is_err());
    }

    #[test]
    fn parametric_plots_values_against_values() {
        let spec = FigureSpec::new("p", "p.png").entry(PlotEntry::parametric(
            "phase",
            aligned(vec![3.0, 4.0]),
            aligned(vec![7.0, 8.0]),
            Style::default(),
        ));
        let fig = compose(spec).unwrap();
        assert_eq!(fig.planar().unwrap().traces[0].points, vec![(3.0, 7.0), (4.0, 8.0)]);
    }

    #[test]
    fn extreme_values_keep_finite_ranges() {
        assert_eq!(padded(Some((-1.7e308, 1.7e308)), 0.05), f64::MIN..f64::MAX);
        let wide = padded(Some((-1e308, 1e308)), 0.05);
        assert!(wide.start.is_finite() && wide.end.is_finite());
        assert_eq!(padded(Some((2.0, 2.0)), 0.05), 1.5..2.5);
        assert_eq!(padded(Some((0.0, 10.0)), 0.05), -0.5..10.5);
    }

    #[test]
    fn undrawable_range_is_rejected() {
        let spec = FigureSpec::new("huge", "huge.png").entry(PlotEntry::series(
            "v",
            aligned(vec![-1e308, 1e308]),
            Style::default(),
        ));
        assert!(matches!(compose(spec), Err(Error::InvalidFigure { .. })));

        let spec = FigureSpec::new("big", "big.png").entry(PlotEntry::series(
            "v",
            aligned(vec![-1e307, 1e307]),
            Style::default(),
        ));
        let fig = compose(spec).unwrap();
        let y = &fig.planar().unwrap().y_range;
        assert!((y.end - y.start).is_finite());
    }

    #[test]
    fn time_entries_must_share_an_axis() {
        let steps = aligned(vec![1.0; 10]);
        let seconds = align(Series::from_values("s", vec![1.0; 10]), &Axis::rescale(30.0, 0.0)).unwrap();
        let spec = FigureSpec::new("mixed", "mixed.png")
            .entry(PlotEntry::series("steps", steps.clone(), Style::default()))
            .entry(PlotEntry::series("seconds", seconds.clone(), Style::default()));
        match compose(spec) {
            Err(Error::AxisMismatch { signal, .. }) => assert_eq!(signal, "seconds"),
            other => panic!("expected an axis mismatch, got {other:?}"),
        }

        let with_unit = align(
            Series::from_values("u", vec![1.0; 10]),
            &Axis::rescale(30.0, 0.0).with_unit("s"),
        )
        .unwrap();
        let spec = FigureSpec::new("units", "units.png")
            .entry(PlotEntry::series("seconds", seconds.clone(), Style::default()))
            .entry(PlotEntry::series("tagged", with_unit, Style::default()));
        assert!(matches!(compose(spec), Err(Error::AxisMismatch { .. })));

        // x of a parametric entry is a value, not time.
        let spec = FigureSpec::new("phase", "phase.png")
            .entry(PlotEntry::series("steps", steps.clone(), Style::default()))
            .entry(PlotEntry::parametric("p", seconds.clone(), seconds, Style::default()));
        compose(spec).unwrap();
    }
}
