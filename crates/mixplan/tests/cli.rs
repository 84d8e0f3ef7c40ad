//! End-to-end runs of the command line over temporary files

use std::fs;
use std::path::Path;

use clap::Parser;
use mixplan::{Cli, run};
use serde_json::{Value, json};

fn write_observations(dir: &Path, days: usize) -> std::path::PathBuf {
    let start = jiff::civil::date(2024, 3, 1);
    let mut rows = Vec::new();
    for d in 0..days {
        let date = start.checked_add(jiff::Span::new().days(d as i64)).unwrap();
        let search = 100.0 + ((d * d * 17 + d * 29 + 3) % 53) as f64 * 10.0;
        let social = 50.0 + ((d * d * 23 + d * 7 + 5) % 47) as f64 * 5.0;
        let revenue = 2.0 * search + 4.0 * social + 10.0 * ((d * 13 % 7) as f64 - 3.0);
        rows.push(json!({"date": date.to_string(), "channel": "search", "spend": search, "revenue": revenue}));
        rows.push(json!({"date": date.to_string(), "channel": "social", "spend": social, "revenue": 0.0}));
    }
    let path = dir.join("observations.json");
    fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();
    path
}

fn run_to_json(args: &[&str], output: &Path) -> Value {
    let mut argv = vec!["mixplan", "--output", output.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    run(&cli).unwrap();
    serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap()
}

#[test]
fn test_attribute_writes_result() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_observations(dir.path(), 75);
    let config = dir.path().join("settings.yaml");
    fs::write(&config, "attribution:\n  bootstrap_count: 20\n  seed: 3\n").unwrap();
    let output = dir.path().join("attribution.json");

    let report = run_to_json(
        &[
            "--config",
            config.to_str().unwrap(),
            "attribute",
            "--data",
            data.to_str().unwrap(),
        ],
        &output,
    );

    assert_eq!(report["model_version"], "ridge_v1");
    assert_eq!(report["sample_count"], 75);
    let search = report["marginal_roas"]["search"].as_f64().unwrap();
    assert!((search - 2.0).abs() < 0.5, "search roas {search}");
    assert!(report["confidence_intervals"]["social"]["lower"].is_number());
}

#[test]
fn test_optimize_respects_cli_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let roas = dir.path().join("roas.json");
    fs::write(&roas, r#"{"search": 3.0, "social": 1.2, "tv": 0.9}"#).unwrap();
    let output = dir.path().join("plan.json");

    let report = run_to_json(
        &[
            "optimize",
            "--roas",
            roas.to_str().unwrap(),
            "--budget",
            "9000",
            "--min",
            "tv=1000",
            "--max",
            "search=4000",
        ],
        &output,
    );

    let allocations = report["allocations"].as_object().unwrap();
    let total: f64 = allocations.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 9000.0).abs() < 1e-3);
    assert!(allocations["tv"].as_f64().unwrap() >= 1000.0);
    assert!(allocations["search"].as_f64().unwrap() <= 4000.0);
    assert!(report["optimization_status"].is_boolean());
    assert_eq!(report["total_budget"], 9000.0);
}

#[test]
fn test_compare_keeps_scenario_order() {
    let dir = tempfile::tempdir().unwrap();
    let roas = dir.path().join("roas.json");
    fs::write(&roas, r#"{"search": 2.0, "social": 1.0}"#).unwrap();
    let scenarios = dir.path().join("scenarios.json");
    fs::write(
        &scenarios,
        r#"[{"search": 1000.0, "social": 1000.0}, {"search": 500.0}]"#,
    )
    .unwrap();
    let output = dir.path().join("compare.json");

    let report = run_to_json(
        &[
            "compare",
            "--roas",
            roas.to_str().unwrap(),
            "--scenarios",
            scenarios.to_str().unwrap(),
            "--budget",
            "2000",
        ],
        &output,
    );

    let results = report.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["scenario_id"], 0);
    assert_eq!(results[1]["scenario_id"], 1);
    // 500 * 2 / 1.5 over a 2000 budget
    let roi = results[1]["expected_roi"].as_f64().unwrap();
    assert!((roi - 500.0 * 2.0 / 1.5 / 2000.0).abs() < 1e-9);
}

#[test]
fn test_forecast_with_plan() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_observations(dir.path(), 40);
    let plan = dir.path().join("plan.json");
    fs::write(&plan, r#"{"search": [500.0, 500.0], "social": [100.0]}"#).unwrap();
    let output = dir.path().join("forecast.json");

    let report = run_to_json(
        &[
            "forecast",
            "--data",
            data.to_str().unwrap(),
            "--horizon",
            "5",
            "--future-spend",
            plan.to_str().unwrap(),
        ],
        &output,
    );

    assert_eq!(report["horizon"], 5);
    let points = report["points"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[0]["date"], "2024-04-10");
}

#[test]
fn test_insufficient_history_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_observations(dir.path(), 10);
    let cli = Cli::try_parse_from(["mixplan", "attribute", "--data", data.to_str().unwrap()])
        .unwrap();
    let err = run(&cli).unwrap_err();
    assert!(err.to_string().contains("insufficient data"), "{err}");
}
