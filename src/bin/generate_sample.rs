//! Writes a deterministic demo set of trace files plus `manifest.json`.
//!
//! ```text
//! cargo run --bin generate_sample -- sample
//! cargo run -- sample/manifest.json
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

/// Write header-less rows, one record per line.
fn write_trace(path: &Path, rows: impl IntoIterator<Item = Vec<f64>>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Logistic growth towards `level` with a little measurement noise.
fn concentration(rng: &mut StdRng, steps: usize, rate: f64, level: f64) -> Vec<f64> {
    (0..steps)
        .map(|i| {
            let t = i as f64;
            let clean = level / (1.0 + (-(t - 100.0) * rate).exp());
            clean + rng.gen_range(-0.01..0.01) * level
        })
        .collect()
}

fn write_physiology(path: &Path, rng: &mut StdRng) -> Result<()> {
    let t: Vec<i64> = (0..10).map(|i| i * 10).collect();
    let energy: Vec<f64> = t.iter().map(|&t| 80.0 - 0.3 * t as f64 + rng.gen_range(-1.0..1.0)).collect();
    let rate: Vec<f64> = t.iter().map(|&t| 60.0 + 0.5 * t as f64 + rng.gen_range(-2.0..2.0)).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("t", DataType::Int64, false),
        Field::new("E", DataType::Float64, false),
        Field::new("R", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(t)),
            Arc::new(Float64Array::from(energy)),
            Arc::new(Float64Array::from(rate)),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "sample".to_string());
    let out = Path::new(&out_dir);
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let mut rng = StdRng::seed_from_u64(42);

    // Protein concentration for three degradation rates, 300 steps each.
    for (label, rate) in [("0.3", 0.03), ("0.4", 0.04), ("0.5", 0.05)] {
        let values = concentration(&mut rng, 300, rate, 1.0);
        write_trace(
            &out.join(format!("protein_{label}.csv")),
            values.into_iter().map(|v| vec![v]),
        )?;
    }

    // Three-valued robustness evaluation per step.
    write_trace(
        &out.join("robustness.csv"),
        (0..300).map(|_| vec![f64::from(rng.gen_range(-1i32..=1))]),
    )?;

    // Two vehicles, 300 steps of (x, y).
    let mut other = Vec::with_capacity(300);
    let mut mine = Vec::with_capacity(300);
    for i in 0..300 {
        let t = i as f64;
        other.push(vec![t * 0.8, rng.gen_range(-0.05..0.05)]);
        let lane = if (100..200).contains(&i) { 3.5 } else { 0.0 };
        mine.push(vec![t * 1.0, lane + rng.gen_range(-0.05..0.05)]);
    }
    write_trace(&out.join("other_trajectory.csv"), other)?;
    write_trace(&out.join("my_trajectory.csv"), mine)?;

    // Confidence-interval bounds over 1000 steps; only the tail is plotted.
    let mut lower = Vec::with_capacity(1000);
    let mut upper = Vec::with_capacity(1000);
    for i in 0..1000 {
        let centre = (i as f64 / 100.0).sin();
        let half = 1.0 / (1.0 + i as f64 / 50.0) + rng.gen_range(0.0..0.01);
        lower.push(vec![centre - half]);
        upper.push(vec![centre + half]);
    }
    write_trace(&out.join("ci_lower.csv"), lower)?;
    write_trace(&out.join("ci_upper.csv"), upper)?;

    write_physiology(&out.join("physiology.parquet"), &mut rng)?;

    let manifest = json!({
        "input_dir": ".",
        "output_dir": "figures",
        "figures": [
            {
                "name": "protein",
                "title": "Protein concentration by degradation rate",
                "output": "protein.png",
                "x_label": "Time (s)",
                "y_label": "Concentration",
                "y2_label": "Robustness",
                "axis": { "kind": "rescale", "multiplier": 30.0, "unit": "s" },
                "series": [
                    { "label": "0.3", "path": "protein_0.3.csv", "fields": ["conc"] },
                    { "label": "0.4", "path": "protein_0.4.csv", "fields": ["conc"] },
                    { "label": "0.5", "path": "protein_0.5.csv", "fields": ["conc"] },
                    { "label": "robustness", "path": "robustness.csv", "fields": ["rob"],
                      "style": { "mark": "scatter", "marker": "cross", "color": "k", "axis": "secondary" } }
                ]
            },
            {
                "name": "overtake",
                "title": "Scenario1 single trajectory, cycle=2",
                "output": "overtake_trajectory.png",
                "trajectories": [
                    { "label": "other", "path": "other_trajectory.csv", "fields": ["x", "y"],
                      "x": "x", "y": "y", "style": { "color": "orange" } },
                    { "label": "controlled", "path": "my_trajectory.csv", "fields": ["x", "y"],
                      "x": "x", "y": "y", "style": { "color": "b" } }
                ]
            },
            {
                "name": "ci_width",
                "title": "Confidence interval width",
                "output": "ci_width.png",
                "x_label": "Step",
                "y_label": "Width",
                "y_scale": "log",
                "intervals": [
                    { "label": "width",
                      "lower": { "path": "ci_lower.csv", "fields": ["lo"], "window": [550, 1000] },
                      "upper": { "path": "ci_upper.csv", "fields": ["hi"], "window": [550, 1000] } }
                ]
            },
            {
                "name": "physiology",
                "title": "Energy and heart rate",
                "output": "physiology.png",
                "x_label": "Minute",
                "ticks": [[0, "start"], [50, "mid"], [90, "end"]],
                "series": [
                    { "label": "E", "path": "physiology.parquet", "fields": ["t", "E"], "index_field": "t" },
                    { "label": "R", "path": "physiology.parquet", "fields": ["t", "R"], "index_field": "t",
                      "style": { "line": "dashed" } }
                ]
            },
            {
                "name": "phase",
                "title": "Lane offset against position",
                "output": "phase.png",
                "x_label": "x",
                "y_label": "y",
                "parametric": [
                    { "label": "controlled", "path": "my_trajectory.csv", "fields": ["x", "y"],
                      "x": "x", "y": "y", "style": { "mark": "scatter", "marker": "triangle" } }
                ]
            }
        ]
    });

    let manifest_path = out.join("manifest.json");
    let text = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&manifest_path, text)
        .with_context(|| format!("writing {}", manifest_path.display()))?;

    log::info!("Wrote sample traces and {}", manifest_path.display());
    Ok(())
}
