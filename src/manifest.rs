use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::align::Axis;
use crate::data::compare::LengthPolicy;
use crate::data::loader;
use crate::data::model::{Delimiter, Series, TraceSchema, TraceTable};
use crate::error::{Error, Result};
use crate::figure::spec::{LegendPosition, Style, TickMap, YScale, DEFAULT_SIZE};

// ---------------------------------------------------------------------------
// Manifest – one batch run
// ---------------------------------------------------------------------------

/// A JSON document listing the figures of one batch run.
///
/// ```json
/// {
///   "input_dir": "traces",
///   "output_dir": "figures",
///   "figures": [
///     {
///       "name": "protein",
///       "title": "Protein concentration",
///       "output": "protein.png",
///       "axis": { "kind": "rescale", "multiplier": 30.0 },
///       "series": [
///         { "label": "0.3", "path": "p03.csv", "fields": ["conc"] },
///         { "label": "0.4", "path": "p04.csv", "fields": ["conc"] }
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Base directory of relative trace paths.
    #[serde(default)]
    pub input_dir: PathBuf,
    /// Directory receiving the figure files; created if missing.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub figures: Vec<FigureRequest>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("figures")
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::MissingInput {
                path: path.to_path_buf(),
            },
            _ => Error::io(path, e),
        })?;
        let mut manifest: Manifest = text.parse()?;
        let base = path.parent().unwrap_or(Path::new(""));
        manifest.input_dir = base.join(&manifest.input_dir);
        manifest.output_dir = base.join(&manifest.output_dir);
        Ok(manifest)
    }

    /// Reject manifests whose figures could not all run independently.
    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        let mut outputs = BTreeSet::new();
        for fig in &self.figures {
            if fig.name.trim().is_empty() {
                return Err(Error::Manifest("figure with empty name".into()));
            }
            if !names.insert(fig.name.as_str()) {
                return Err(Error::Manifest(format!("duplicate figure name '{}'", fig.name)));
            }
            if !outputs.insert(normalized(&fig.output)) {
                return Err(Error::Manifest(format!(
                    "figures share the output file '{}'",
                    fig.output
                )));
            }
        }
        Ok(())
    }

    pub fn figure(&self, name: &str) -> Option<&FigureRequest> {
        self.figures.iter().find(|f| f.name == name)
    }
}

/// Spellings such as `a.png` and `./a.png` name the same file.
fn normalized(output: &str) -> PathBuf {
    Path::new(output)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl std::str::FromStr for Manifest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::Manifest(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Figure requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureRequest {
    pub name: String,
    pub title: String,
    /// Output file name inside the output directory.
    pub output: String,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
    #[serde(default)]
    pub y2_label: Option<String>,
    #[serde(default)]
    pub legend: LegendPosition,
    #[serde(default)]
    pub y_scale: YScale,
    #[serde(default)]
    pub size: Option<[u32; 2]>,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub ticks: Option<TickMap>,
    #[serde(default)]
    pub length_policy: LengthPolicy,
    /// Metric name of the primary-axis comparison; defaults to `name`.
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub series: Vec<SeriesSource>,
    #[serde(default)]
    pub trajectories: Vec<PairSource>,
    #[serde(default)]
    pub parametric: Vec<PairSource>,
    #[serde(default)]
    pub intervals: Vec<IntervalSource>,
}

impl FigureRequest {
    pub fn metric(&self) -> &str {
        self.metric.as_deref().unwrap_or(&self.name)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size.map(|[w, h]| (w, h)).unwrap_or(DEFAULT_SIZE)
    }
}

/// One labeled signal read from one trace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSource {
    pub label: String,
    #[serde(flatten)]
    pub trace: TraceSource,
    #[serde(default)]
    pub style: Style,
}

/// Two fields of one trace file, e.g. the `x`/`y` columns of a trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSource {
    pub label: String,
    #[serde(flatten)]
    pub trace: TraceSource,
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub style: Style,
}

/// Lower and upper confidence bounds, plotted as their pointwise width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalSource {
    pub label: String,
    pub lower: TraceSource,
    pub upper: TraceSource,
    #[serde(default)]
    pub style: Style,
}

// ---------------------------------------------------------------------------
// TraceSource – a file plus the schema that names its columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSource {
    pub path: PathBuf,
    pub fields: Vec<String>,
    #[serde(default)]
    pub index_field: Option<String>,
    #[serde(default)]
    pub value_field: Option<String>,
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default)]
    pub skip_rows: usize,
    /// Row positions `[start, end)` to keep.
    #[serde(default)]
    pub window: Option<[usize; 2]>,
}

impl TraceSource {
    pub fn schema(&self) -> Result<TraceSchema> {
        let mut schema = TraceSchema::new(self.fields.iter().cloned())?
            .with_delimiter(self.delimiter)
            .with_skip_rows(self.skip_rows);
        if let Some(index) = &self.index_field {
            schema = schema.with_index(index)?;
        }
        if let Some(value) = &self.value_field {
            schema = schema.with_value(value)?;
        }
        Ok(schema)
    }

    pub fn resolve(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(&self.path)
    }

    pub fn load_table(&self, input_dir: &Path) -> Result<TraceTable> {
        loader::load_table(&self.resolve(input_dir), &self.schema()?)
    }

    /// The schema's value series, windowed.
    pub fn load(&self, input_dir: &Path) -> Result<Series> {
        let series = self.load_table(input_dir)?.default_series()?;
        Ok(self.windowed(series))
    }

    /// Apply the configured window, if any.
    pub fn windowed(&self, series: Series) -> Series {
        match self.window {
            Some([start, end]) => series.window(start..end),
            None => series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "input_dir": "traces",
        "figures": [
            {
                "name": "protein",
                "title": "Protein",
                "output": "protein.png",
                "axis": { "kind": "rescale", "multiplier": 30.0, "unit": "s" },
                "ticks": { "count": 10, "multiplier": 50 },
                "series": [
                    { "label": "0.3", "path": "p03.csv", "fields": ["c"] },
                    { "label": "rob", "path": "r.csv", "fields": ["t", "r"], "index_field": "t",
                      "window": [550, 1000], "style": { "mark": "scatter", "axis": "secondary" } }
                ]
            },
            {
                "name": "overtake",
                "title": "Trajectory",
                "output": "overtake.png",
                "size": [640, 480],
                "trajectories": [
                    { "label": "other", "path": "other.csv", "fields": ["x", "y"], "x": "x", "y": "y",
                      "style": { "color": "orange" } }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_and_applies_defaults() {
        let m: Manifest = MANIFEST.parse().unwrap();
        m.validate().unwrap();
        assert_eq!(m.output_dir, PathBuf::from("figures"));
        let protein = m.figure("protein").unwrap();
        assert_eq!(protein.metric(), "protein");
        assert_eq!(protein.size(), DEFAULT_SIZE);
        assert_eq!(protein.axis, Axis::rescale(30.0, 0.0).with_unit("s"));
        assert_eq!(protein.series[1].trace.window, Some([550, 1000]));
        assert_eq!(protein.series[1].style.axis, crate::figure::spec::YAxis::Secondary);
        let schema = protein.series[1].trace.schema().unwrap();
        assert_eq!(schema.index_field(), Some("t"));

        let overtake = m.figure("overtake").unwrap();
        assert_eq!(overtake.size(), (640, 480));
        assert_eq!(overtake.trajectories[0].x, "x");
    }

    #[test]
    fn duplicate_outputs_are_rejected() {
        let mut m: Manifest = MANIFEST.parse().unwrap();
        m.figures[1].output = "protein.png".into();
        assert!(matches!(m.validate(), Err(Error::Manifest(_))));
    }

    #[test]
    fn equivalent_output_spellings_collide() {
        let mut m: Manifest = MANIFEST.parse().unwrap();
        m.figures[1].output = "./protein.png".into();
        assert!(matches!(m.validate(), Err(Error::Manifest(_))));

        m.figures[1].output = "plots//./overtake.png".into();
        m.figures[0].output = "plots/overtake.png".into();
        assert!(matches!(m.validate(), Err(Error::Manifest(_))));

        m.figures[0].output = "plots/protein.png".into();
        m.validate().unwrap();
    }

    #[test]
    fn bad_json_is_a_manifest_error() {
        assert!(matches!("{".parse::<Manifest>(), Err(Error::Manifest(_))));
    }

    #[test]
    fn relative_dirs_resolve_against_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, MANIFEST).unwrap();
        let m = Manifest::from_path(&path).unwrap();
        assert_eq!(m.input_dir, dir.path().join("traces"));
        assert_eq!(m.output_dir, dir.path().join("figures"));
    }
}
