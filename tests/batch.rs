use std::path::Path;

use trace_compose::batch::{self, BatchOptions};
use trace_compose::figure::{compose, PlotEntry};
use trace_compose::manifest::Manifest;

const MANIFEST: &str = r#"{
    "figures": [
        {
            "name": "protein",
            "title": "Protein concentration",
            "output": "protein.png",
            "size": [320, 240],
            "axis": { "kind": "rescale", "multiplier": 30.0, "unit": "s" },
            "series": [
                { "label": "0.3", "path": "p03.csv", "fields": ["conc"] },
                { "label": "0.4", "path": "p04.csv", "fields": ["conc"] }
            ]
        },
        {
            "name": "broken",
            "title": "Missing input",
            "output": "broken.png",
            "series": [
                { "label": "gone", "path": "does_not_exist.csv", "fields": ["v"] }
            ]
        },
        {
            "name": "overtake",
            "title": "Trajectories",
            "output": "overtake.png",
            "size": [320, 240],
            "trajectories": [
                { "label": "mine", "path": "xy.csv", "fields": ["x", "y"], "x": "x", "y": "y" }
            ]
        }
    ]
}"#;

fn fixture(dir: &Path) -> Manifest {
    let inputs = dir.join("traces");
    std::fs::create_dir_all(&inputs).unwrap();
    let column: String = (0..50).map(|i| format!("{}\n", i as f64 * 0.02)).collect();
    std::fs::write(inputs.join("p03.csv"), &column).unwrap();
    std::fs::write(inputs.join("p04.csv"), &column).unwrap();
    let xy: String = (0..50).map(|i| format!("{},{}\n", i, (i as f64 / 10.0).sin())).collect();
    std::fs::write(inputs.join("xy.csv"), xy).unwrap();

    let mut manifest: Manifest = MANIFEST.parse().unwrap();
    manifest.input_dir = inputs;
    manifest.output_dir = dir.join("figures");
    manifest
}

#[test]
fn one_failing_figure_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = fixture(dir.path());

    let report = batch::run(&manifest, &BatchOptions::default()).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken");
    assert_eq!(report.written.len(), 2);

    let out = dir.path().join("figures");
    assert!(out.join("protein.png").is_file());
    assert!(out.join("overtake.png").is_file());
    assert!(!out.join("broken.png").exists());
}

#[test]
fn check_mode_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = fixture(dir.path());
    let opts = BatchOptions {
        only: Vec::new(),
        check: true,
    };

    let report = batch::run(&manifest, &opts).unwrap();
    assert_eq!(report.checked, ["protein", "overtake"]);
    assert!(report.written.is_empty());
    assert!(!dir.path().join("figures").exists());
}

#[test]
fn only_selects_named_figures() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = fixture(dir.path());
    let opts = BatchOptions {
        only: vec!["protein".into()],
        check: false,
    };

    let report = batch::run(&manifest, &opts).unwrap();
    assert!(report.is_success());
    assert_eq!(report.written, [dir.path().join("figures").join("protein.png")]);
    assert_eq!(report.skipped, ["broken", "overtake"]);
}

#[test]
fn manifest_paths_resolve_against_its_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut manifest = fixture(dir.path());
    manifest.input_dir = ".".into();
    let path = dir.path().join("traces").join("manifest.json");
    std::fs::write(&path, serde_json::to_string(&manifest).unwrap()).unwrap();

    let loaded = Manifest::from_path(&path).unwrap();
    let spec = batch::figure_spec(&loaded.input_dir, loaded.figure("protein").unwrap()).unwrap();
    assert_eq!(spec.entries.len(), 2);
}

fn request(dir: &Path, figure: &str) -> Manifest {
    let mut manifest: Manifest = format!(r#"{{ "figures": [ {figure} ] }}"#).parse().unwrap();
    manifest.input_dir = dir.to_path_buf();
    manifest.output_dir = dir.join("figures");
    manifest
}

fn column(values: &[f64]) -> String {
    values.iter().map(|v| format!("{v}\n")).collect()
}

#[test]
fn interval_figure_plots_the_windowed_width() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lo.csv"), column(&[0.0, 1.0, 2.0, 3.0, 4.0])).unwrap();
    std::fs::write(dir.path().join("hi.csv"), column(&[1.0, 3.0, 5.0, 7.0, 9.0])).unwrap();
    let manifest = request(
        dir.path(),
        r#"{
            "name": "ci", "title": "CI width", "output": "ci.png", "y_scale": "log",
            "intervals": [ { "label": "width",
                "lower": { "path": "lo.csv", "fields": ["lo"], "window": [1, 4] },
                "upper": { "path": "hi.csv", "fields": ["hi"], "window": [1, 4] } } ]
        }"#,
    );

    let spec = batch::figure_spec(&manifest.input_dir, &manifest.figures[0]).unwrap();
    match &spec.entries[..] {
        [PlotEntry::Series { label, series, .. }] => {
            assert_eq!(label, "width");
            assert_eq!(series.x(), &[1.0, 2.0, 3.0]);
            assert_eq!(series.values(), &[2.0, 3.0, 4.0]);
        }
        other => panic!("expected one width series, got {} entries", other.len()),
    }

    let report = batch::run(&manifest, &BatchOptions::default()).unwrap();
    assert!(report.is_success());
    assert!(dir.path().join("figures").join("ci.png").is_file());
}

#[test]
fn parametric_figure_plots_values_against_values() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("xy.csv"), "0,5\n2,4\n4,3\n").unwrap();
    let manifest = request(
        dir.path(),
        r#"{
            "name": "phase", "title": "Phase", "output": "phase.png",
            "parametric": [ { "label": "path", "path": "xy.csv", "fields": ["x", "y"],
                              "x": "x", "y": "y", "style": { "mark": "scatter" } } ]
        }"#,
    );

    let spec = batch::figure_spec(&manifest.input_dir, &manifest.figures[0]).unwrap();
    let figure = compose(spec).unwrap();
    let planar = figure.planar().unwrap();
    assert_eq!(planar.traces[0].points, vec![(0.0, 5.0), (2.0, 4.0), (4.0, 3.0)]);
    assert_eq!(figure.legend_labels(), ["path"]);
}

#[test]
fn mixed_axis_series_keep_manifest_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("offset.csv"), column(&[0.0, 1.0, 0.0])).unwrap();
    std::fs::write(dir.path().join("distance.csv"), column(&[10.0, 20.0, 30.0, 40.0])).unwrap();
    std::fs::write(dir.path().join("speed.csv"), column(&[1.0, 2.0, 3.0, 4.0])).unwrap();
    let figure = |policy: &str| {
        format!(
            r#"{{
                "name": "lane", "title": "Lane change", "output": "lane.png",
                "length_policy": "{policy}",
                "series": [
                    {{ "label": "offset", "path": "offset.csv", "fields": ["o"],
                       "style": {{ "mark": "scatter", "axis": "secondary" }} }},
                    {{ "label": "distance", "path": "distance.csv", "fields": ["d"] }},
                    {{ "label": "speed", "path": "speed.csv", "fields": ["v"] }}
                ]
            }}"#
        )
    };

    let manifest = request(dir.path(), &figure("fail_on_mismatch"));
    let spec = batch::figure_spec(&manifest.input_dir, &manifest.figures[0]).unwrap();
    let composed = compose(spec).unwrap();
    assert_eq!(composed.legend_labels(), ["offset", "distance", "speed"]);
    assert_eq!(composed.planar().unwrap().secondary().count(), 1);

    // The comparison's length policy covers primary-axis members only.
    std::fs::write(dir.path().join("speed.csv"), column(&[1.0, 2.0, 3.0])).unwrap();
    let err = batch::figure_spec(&manifest.input_dir, &manifest.figures[0]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<trace_compose::Error>(),
        Some(trace_compose::Error::LengthMismatch { .. })
    ));

    let manifest = request(dir.path(), &figure("truncate_to_shortest"));
    let spec = batch::figure_spec(&manifest.input_dir, &manifest.figures[0]).unwrap();
    let lens: Vec<usize> = spec
        .entries
        .iter()
        .map(|e| match e {
            PlotEntry::Series { series, .. } => series.len(),
            _ => 0,
        })
        .collect();
    assert_eq!(lens, [3, 3, 3]);
}
