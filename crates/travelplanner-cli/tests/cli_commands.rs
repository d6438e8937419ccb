use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

const ONE_WAY_DATASET: &str = r#"{
    "locations": [
        {"name": "North Gate", "latitude": 30.40, "longitude": 78.05},
        {"name": "Market", "latitude": 30.33, "longitude": 78.04},
        {"name": "Lake", "latitude": 30.30, "longitude": 78.10}
    ],
    "connections": {
        "North Gate": ["Market"],
        "Market": ["North Gate", "Lake"]
    }
}"#;

/// CLI with every provider disabled so nothing leaves the machine.
fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("travelplanner-cli");
    cmd.env_remove("ORS_API_KEY")
        .env_remove("OPENWEATHER_API_KEY")
        .env_remove("AVERAGE_SPEED_KMH")
        .env_remove("FUEL_MILEAGE_KM_PER_LITRE")
        .env_remove("FUEL_PRICE_PER_LITRE")
        .env("NOMINATIM_BASE_URL", "")
        .env("RUST_LOG", "error");
    cmd
}

fn write_dataset(contents: &str) -> (PathBuf, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("dataset.json");
    fs::write(&path, contents).expect("write dataset");
    (path, dir)
}

#[test]
fn route_prints_path_and_estimate() {
    cli()
        .args(["route", "--from", "Clock Tower", "--to", "Sahastradhara"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Route from Clock Tower to Sahastradhara:"))
        .stdout(predicate::str::contains("Distance: "))
        .stdout(predicate::str::contains("minutes"))
        .stdout(predicate::str::contains("(graph_path)"));
}

#[test]
fn route_json_uses_service_field_names() {
    let output = cli()
        .args(["--format", "json", "route", "--from", "Gandhi Park", "--to", "Gandhi Park"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["path"], serde_json::json!(["Gandhi Park"]));
    assert_eq!(value["distance"], 0.0);
    assert_eq!(value["time"], "0 minutes");
    assert_eq!(value["polyline_source"], "direct");
    assert_eq!(value["polyline_coords"].as_array().map(Vec::len), Some(2));
}

#[test]
fn unknown_location_lists_valid_names() {
    cli()
        .args(["route", "--from", "Clock Towr", "--to", "Sahastradhara"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown location: Clock Towr"))
        .stderr(predicate::str::contains("Did you mean 'Clock Tower'?"))
        .stderr(predicate::str::contains("valid locations:"))
        .stderr(predicate::str::contains("Tapkeshwar Temple"));
}

#[test]
fn alternatives_respect_max() {
    let output = cli()
        .args([
            "--format",
            "json",
            "alternatives",
            "--from",
            "Forest Research Institute",
            "--to",
            "Sahastradhara",
            "--max",
            "2",
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let count = value["count"].as_u64().expect("count");
    assert!((1..=2).contains(&count));
    assert_eq!(value["routes"][0]["path"][0], "Forest Research Institute");
}

#[test]
fn alternatives_reject_zero_max() {
    cli()
        .args(["alternatives", "--from", "Clock Tower", "--to", "Pacific Mall", "--max", "0"])
        .assert()
        .failure();
}

#[test]
fn nearby_sorts_by_rating() {
    let output = cli()
        .args(["nearby", "--location", "Rajpur Road", "--type", "cafe"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let orchard = stdout.find("Orchard Cafe").expect("Orchard Cafe listed");
    let barista = stdout.find("Barista").expect("Barista listed");
    assert!(orchard < barista);
}

#[test]
fn locations_lists_every_name() {
    let output = cli().arg("locations").output().expect("run cli");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout.lines().count(), 16);
    assert!(stdout.lines().any(|line| line == "ISBT Dehradun"));
}

#[test]
fn check_builtin_dataset_passes_strict() {
    cli()
        .args(["check", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Locations: 16"))
        .stdout(predicate::str::contains("No one-way connections"));
}

#[test]
fn check_reports_one_way_connections() {
    let (path, _dir) = write_dataset(ONE_WAY_DATASET);

    cli()
        .env("RUST_LOG", "warn")
        .arg("--dataset")
        .arg(&path)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("One-way connections: 1"))
        .stdout(predicate::str::contains("Market -> Lake"))
        .stderr(predicate::function(|err: &str| {
            err.matches("connection declared in one direction only").count() == 1
        }));

    cli()
        .arg("--dataset")
        .arg(&path)
        .args(["check", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("one-way connection"));
}

#[test]
fn custom_dataset_routes_without_places() {
    let (path, _dir) = write_dataset(ONE_WAY_DATASET);

    cli()
        .arg("--dataset")
        .arg(&path)
        .args(["route", "--from", "North Gate", "--to", "Lake"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2. Market"))
        .stdout(predicate::str::contains("3. Lake"));

    cli()
        .arg("--dataset")
        .arg(&path)
        .args(["nearby", "--location", "Market"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No places found near Market"));
}

#[test]
fn unreachable_route_fails() {
    let (path, _dir) = write_dataset(ONE_WAY_DATASET);

    cli()
        .arg("--dataset")
        .arg(&path)
        .args(["route", "--from", "Lake", "--to", "Market"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no route found between Lake and Market"));
}

#[test]
fn missing_dataset_file_is_reported() {
    cli()
        .args(["--dataset", "/nonexistent/dataset.json", "locations"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load dataset from"));
}
