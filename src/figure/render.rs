use std::sync::OnceLock;

use image::RgbImage;
use plotters::backend::BitMapBackend;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};

use crate::color::Rgb;
use crate::error::{Error, Result};

use super::compose::{ComposedFigure, LegendEntry, Planar, Plot, Space, Trace};
use super::spec::{format_number, Corner, LineStyle, Mark, Marker, YAxis};

/// Family name the bundled font is registered under.
const FONT: &str = "sans-serif";
const FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

const MARKER_SIZE: i32 = 4;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Rasterize a composed figure into an RGB image of `figure.size` pixels.
pub fn rasterize(figure: &ComposedFigure) -> Result<RgbImage> {
    ensure_font()?;

    let (width, height) = figure.size;
    if width == 0 || height == 0 {
        return Err(Error::Render(format!(
            "figure '{}' has zero size {width}x{height}",
            figure.title
        )));
    }

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        match &figure.plot {
            Plot::Planar(planar) => draw_planar(&root, figure, planar)?,
            Plot::Trajectory3d(space) => draw_space(&root, figure, space)?,
        }
        root.present().map_err(render_err)?;
    }

    RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| Error::Render("pixel buffer does not match figure size".into()))
}

fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font(FONT, FontStyle::Normal, FONT_BYTES).is_ok());
    if ok {
        Ok(())
    } else {
        Err(Error::Render("bundled font could not be loaded".into()))
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn label_position(corner: Corner) -> SeriesLabelPosition {
    match corner {
        Corner::UpperRight => SeriesLabelPosition::UpperRight,
        Corner::UpperLeft => SeriesLabelPosition::UpperLeft,
        Corner::LowerLeft => SeriesLabelPosition::LowerLeft,
        Corner::LowerRight => SeriesLabelPosition::LowerRight,
    }
}

// ---------------------------------------------------------------------------
// 2-D figures
// ---------------------------------------------------------------------------

fn draw_planar(root: &Area<'_>, figure: &ComposedFigure, p: &Planar) -> Result<()> {
    let mut builder = ChartBuilder::on(root);
    builder
        .caption(&figure.title, (FONT, 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65);
    if p.y2_range.is_some() {
        builder.right_y_label_area_size(65);
    }
    let chart = builder
        .build_cartesian_2d(p.x_range.clone(), p.y_range.clone())
        .map_err(render_err)?;
    let y2_range = p.y2_range.clone().unwrap_or(0.0..1.0);
    let mut chart = chart.set_secondary_coord(p.x_range.clone(), y2_range);

    let x_fmt = |v: &f64| format_number(*v);
    let y_fmt = |v: &f64| p.y_tick_label(*v);

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .light_line_style(BLACK.mix(0.05))
            .label_style((FONT, 13))
            .axis_desc_style((FONT, 15));
        if p.ticks.is_some() {
            mesh.x_labels(0);
        }
        mesh.draw().map_err(render_err)?;
    }

    if p.y2_range.is_some() {
        let mut axes = chart.configure_secondary_axes();
        axes.x_labels(0)
            .y_label_formatter(&x_fmt)
            .label_style((FONT, 13))
            .axis_desc_style((FONT, 15));
        if let Some(label) = &figure.y2_label {
            axes.y_desc(label.as_str());
        }
        axes.draw().map_err(render_err)?;
    }

    if let Some(ticks) = &p.ticks {
        let style = TextStyle::from((FONT, 13).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
        for (v, label) in ticks {
            if *v < p.x_range.start || *v > p.x_range.end {
                continue;
            }
            let (px, py) = chart.backend_coord(&(*v, p.y_range.start));
            root.draw(&PathElement::new(vec![(px, py), (px, py + 5)], BLACK))
                .map_err(render_err)?;
            root.draw(&Text::new(label.clone(), (px, py + 8), style.clone()))
                .map_err(render_err)?;
        }
    }

    for (trace, entry) in p.traces.iter().zip(&figure.legend) {
        let elements = trace_elements::<BitMapBackend>(trace);
        let anno = match trace.axis {
            YAxis::Primary => chart.draw_series(elements),
            YAxis::Secondary => chart.draw_secondary_series(elements),
        }
        .map_err(render_err)?;
        let glyph = entry.clone();
        anno.label(trace.label.as_str())
            .legend(move |(x, y)| legend_glyph::<BitMapBackend>(&glyph, x, y));
    }

    chart
        .configure_series_labels()
        .position(label_position(figure.legend_position))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, 13))
        .draw()
        .map_err(render_err)?;
    Ok(())
}

fn trace_elements<DB: DrawingBackend>(trace: &Trace) -> Vec<DynElement<'static, DB, (f64, f64)>> {
    let color = rgb(trace.color);
    let mut elements = Vec::new();
    if trace.mark == Mark::Line {
        let style = ShapeStyle::from(color).stroke_width(2);
        for run in finite_runs(&trace.points, |p| p.0.is_finite() && p.1.is_finite()) {
            if run.len() > 1 {
                elements.push(path_element(run, trace.line, style));
            }
        }
    }
    if let Some(marker) = trace.marker {
        let style = ShapeStyle::from(color).filled();
        elements.extend(
            trace
                .points
                .iter()
                .filter(|p| p.0.is_finite() && p.1.is_finite())
                .map(|&p| marker_element(marker, p, style)),
        );
    }
    elements
}

// ---------------------------------------------------------------------------
// 3-D trajectories
// ---------------------------------------------------------------------------

/// Time runs along the horizontal axis, `y` is vertical and `x` is depth.
fn draw_space(root: &Area<'_>, figure: &ComposedFigure, s: &Space) -> Result<()> {
    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, (FONT, 22))
        .margin(20)
        .build_cartesian_3d(s.t_range.clone(), s.y_range.clone(), s.x_range.clone())
        .map_err(render_err)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.25;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    let fmt = |v: &f64| format_number(*v);
    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .label_style((FONT, 12))
        .x_formatter(&fmt)
        .y_formatter(&fmt)
        .z_formatter(&fmt)
        .draw()
        .map_err(render_err)?;

    for (path, entry) in s.paths.iter().zip(&figure.legend) {
        let style = ShapeStyle::from(rgb(path.color)).stroke_width(2);
        let elements: Vec<DynElement<'static, BitMapBackend, (f64, f64, f64)>> = finite_runs(&path.points, |p| {
            p.0.is_finite() && p.1.is_finite() && p.2.is_finite()
        })
        .into_iter()
        .filter(|run| run.len() > 1)
        .map(|run| {
            let run = run.into_iter().map(|(t, x, y)| (t, y, x)).collect();
            path_element(run, path.line, style)
        })
        .collect();
        let glyph = entry.clone();
        chart
            .draw_series(elements)
            .map_err(render_err)?
            .label(path.label.as_str())
            .legend(move |(x, y)| legend_glyph::<BitMapBackend>(&glyph, x, y));
    }

    chart
        .configure_series_labels()
        .position(label_position(figure.legend_position))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, 13))
        .draw()
        .map_err(render_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Element helpers
// ---------------------------------------------------------------------------

/// Maximal runs of consecutive points accepted by `keep`.
fn finite_runs<C: Copy>(points: &[C], keep: impl Fn(&C) -> bool) -> Vec<Vec<C>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for p in points {
        if keep(p) {
            current.push(*p);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn path_element<DB: DrawingBackend, C: Clone + 'static>(
    points: Vec<C>,
    line: LineStyle,
    style: ShapeStyle,
) -> DynElement<'static, DB, C> {
    match line {
        LineStyle::Solid => PathElement::new(points, style).into_dyn(),
        LineStyle::Dashed => DashedPathElement::new(points, 8, 5, style).into_dyn(),
        LineStyle::Dotted => DashedPathElement::new(points, 2, 4, style).into_dyn(),
    }
}

fn marker_element<DB: DrawingBackend, C: Clone + 'static>(
    marker: Marker,
    at: C,
    style: ShapeStyle,
) -> DynElement<'static, DB, C> {
    match marker {
        Marker::Circle => Circle::new(at, MARKER_SIZE, style).into_dyn(),
        Marker::Cross => Cross::new(at, MARKER_SIZE, style).into_dyn(),
        Marker::Triangle => TriangleMarker::new(at, MARKER_SIZE, style).into_dyn(),
    }
}

/// Legend sample: a short stroke for lines, a single marker for scatters.
fn legend_glyph<DB: DrawingBackend>(
    entry: &LegendEntry,
    x: i32,
    y: i32,
) -> DynElement<'static, DB, (i32, i32)> {
    let color = rgb(entry.color);
    match entry.mark {
        Mark::Scatter => marker_element(
            entry.marker.unwrap_or(Marker::Circle),
            (x + 10, y),
            ShapeStyle::from(color).filled(),
        ),
        Mark::Line => path_element(
            vec![(x, y), (x + 20, y)],
            entry.line,
            ShapeStyle::from(color).stroke_width(2),
        ),
    }
}
