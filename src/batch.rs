use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::data::align::{align, AlignedSeries};
use crate::data::compare;
use crate::data::stats::{interval_width, summarize};
use crate::figure::spec::{FigureSpec, PlotEntry, YAxis};
use crate::figure::{compose, export};
use crate::manifest::{FigureRequest, Manifest, PairSource, TraceSource};

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Run only these figures; empty means all.
    pub only: Vec<String>,
    /// Load and compose, but write no images.
    pub check: bool,
}

impl BatchOptions {
    fn selects(&self, name: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|n| n == name)
    }
}

/// Outcome of every figure of one run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written, in manifest order.
    pub written: Vec<PathBuf>,
    /// Figures composed under `--check`.
    pub checked: Vec<String>,
    /// Figures not selected by `--only`.
    pub skipped: Vec<String>,
    pub failed: Vec<(String, anyhow::Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run every selected figure of `manifest`.
///
/// Each figure either completes or fails on its own; a failure is logged,
/// recorded in the report, and the next figure still runs.
pub fn run(manifest: &Manifest, opts: &BatchOptions) -> Result<BatchReport> {
    manifest.validate()?;

    for name in &opts.only {
        if manifest.figure(name).is_none() {
            log::warn!("--only {name}: no such figure in the manifest");
        }
    }

    if !opts.check {
        std::fs::create_dir_all(&manifest.output_dir).with_context(|| {
            format!("creating output directory {}", manifest.output_dir.display())
        })?;
    }

    let mut report = BatchReport::default();
    for request in &manifest.figures {
        if !opts.selects(&request.name) {
            log::warn!("Skipping figure '{}'", request.name);
            report.skipped.push(request.name.clone());
            continue;
        }

        log::info!("Figure '{}' → {}", request.name, request.output);
        match run_figure(manifest, request, opts.check) {
            Ok(Some(path)) => report.written.push(path),
            Ok(None) => report.checked.push(request.name.clone()),
            Err(e) => {
                log::error!("Figure '{}' failed: {e:#}", request.name);
                report.failed.push((request.name.clone(), e));
            }
        }
    }

    log::info!(
        "{} written, {} checked, {} skipped, {} failed",
        report.written.len(),
        report.checked.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

fn run_figure(manifest: &Manifest, request: &FigureRequest, check: bool) -> Result<Option<PathBuf>> {
    let spec = figure_spec(&manifest.input_dir, request)?;
    let figure = compose(spec).with_context(|| format!("composing '{}'", request.name))?;
    if check {
        return Ok(None);
    }
    let path = manifest.output_dir.join(&request.output);
    export(&figure, &path).with_context(|| format!("exporting {}", path.display()))?;
    Ok(Some(path))
}

/// Load, align and bundle everything one figure request names.
///
/// Primary-axis `series` form the figure's comparison set under its metric,
/// so its length policy applies to them; secondary-axis series join no set.
/// Entries keep the manifest's order either way.
pub fn figure_spec(input_dir: &Path, request: &FigureRequest) -> Result<FigureSpec> {
    let (w, h) = request.size();
    let mut spec = FigureSpec::new(&request.title, &request.output)
        .labels(&request.x_label, &request.y_label)
        .legend(request.legend)
        .y_scale(request.y_scale)
        .size(w, h);
    if let Some(label) = &request.y2_label {
        spec = spec.secondary_label(label);
    }
    if let Some(ticks) = &request.ticks {
        spec = spec.ticks(ticks.clone());
    }

    let mut primary = Vec::new();
    let mut standalone = Vec::with_capacity(request.series.len());
    for source in &request.series {
        let series = source
            .trace
            .load(input_dir)
            .with_context(|| format!("series '{}'", source.label))?;
        let aligned = align(series, &request.axis)?;
        match source.style.axis {
            YAxis::Primary => {
                primary.push((source.label.clone(), aligned));
                standalone.push(None);
            }
            YAxis::Secondary => standalone.push(Some(aligned)),
        }
    }
    let mut members = if primary.is_empty() {
        Vec::new()
    } else {
        compare::build(primary, request.metric(), request.length_policy)?.into_members()
    }
    .into_iter();
    for (source, standalone) in request.series.iter().zip(standalone) {
        let series = match standalone {
            Some(aligned) => aligned,
            None => match members.next() {
                Some((_, aligned)) => aligned,
                None => bail!("comparison '{}' lost member '{}'", request.metric(), source.label),
            },
        };
        spec = spec.entry(PlotEntry::series(&source.label, series, source.style));
    }

    for pair in &request.trajectories {
        let (x, y) = load_pair(input_dir, pair, request)
            .with_context(|| format!("trajectory '{}'", pair.label))?;
        spec = spec.entry(PlotEntry::trajectory(&pair.label, x, y, pair.style));
    }

    for pair in &request.parametric {
        let (x, y) = load_pair(input_dir, pair, request)
            .with_context(|| format!("parametric '{}'", pair.label))?;
        spec = spec.entry(PlotEntry::parametric(&pair.label, x, y, pair.style));
    }

    for interval in &request.intervals {
        let load = |source: &TraceSource| -> Result<AlignedSeries> {
            let series = source.load(input_dir)?;
            Ok(align(series, &request.axis)?)
        };
        let lower = load(&interval.lower)
            .with_context(|| format!("interval '{}' lower bound", interval.label))?;
        let upper = load(&interval.upper)
            .with_context(|| format!("interval '{}' upper bound", interval.label))?;
        let width = interval_width(&lower, &upper, &interval.label)?;
        match summarize(width.values()) {
            Some(s) => log::info!(
                "{}: max width {:.4}, mean width {:.4} over {} points",
                interval.label,
                s.max,
                s.mean,
                s.len
            ),
            None => log::warn!("{}: interval width has no finite values", interval.label),
        }
        spec = spec.entry(PlotEntry::series(&interval.label, width, interval.style));
    }

    Ok(spec)
}

fn load_pair(
    input_dir: &Path,
    pair: &PairSource,
    request: &FigureRequest,
) -> Result<(AlignedSeries, AlignedSeries)> {
    let table = pair.trace.load_table(input_dir)?;
    let x = pair.trace.windowed(table.series(&pair.x)?);
    let y = pair.trace.windowed(table.series(&pair.y)?);
    Ok((align(x, &request.axis)?, align(y, &request.axis)?))
}
