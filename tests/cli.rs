mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::write_passes;

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("brickset "));
}

#[test]
fn empty_root_reports_no_images() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.current_dir(temp.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No images found to cluster."));
    assert!(!temp.path().join("yolo_dataset").exists());
}

#[test]
fn missing_root_fails() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg(temp.path().join("missing"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn rejects_out_of_range_fraction() {
    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.args(["--val-fraction", "1.5"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("fraction must be between 0.0 and 1.0"));
}

#[test]
fn rejects_fractions_summing_above_one() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg(temp.path())
        .args(["--val-fraction", "0.6", "--test-fraction", "0.6"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must not sum above 1.0"));
}

#[test]
fn exports_dataset_and_prints_summary() {
    let temp = tempfile::tempdir().unwrap();
    let captures = temp.path().join("captures");
    write_passes(&captures.join("bricks/3001_brick"), 20, 3);
    write_passes(&captures.join("3002_brick"), 3, 1);
    let output = temp.path().join("dataset");

    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg(&captures)
        .arg("--output")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Skipping 3002_brick with only 3 clusters (min 20)."))
        .stdout(predicate::str::contains("Total Clusters: 20"))
        .stdout(predicate::str::contains("Total Images:   60"))
        .stdout(predicate::str::contains("Train:  10 clusters (50.0%),   10 images"))
        .stdout(predicate::str::contains("Val:     5 clusters (25.0%),   15 images"))
        .stdout(predicate::str::contains("Test:    5 clusters (25.0%),   15 images"));

    assert!(output.join("bricks.yaml").is_file());
    assert!(output.join("images/train2023/3001_brick").is_dir());
    assert!(output.join("labels/val2023/3001_brick").is_dir());
}

#[test]
fn json_report_is_machine_readable() {
    let temp = tempfile::tempdir().unwrap();
    let captures = temp.path().join("captures");
    write_passes(&captures.join("3001_brick"), 4, 1);

    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg(&captures)
        .args(["--min-clusters", "1", "--dry-run", "--report", "json"])
        .arg("--output")
        .arg(temp.path().join("dataset"));
    let assert = cmd.assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["total_clusters"], 4);
    assert_eq!(report["val"]["clusters"], 1);
    assert_eq!(report["test"]["clusters"], 1);
    assert_eq!(report["train"]["clusters"], 2);
    assert_eq!(report["dry_run"], true);
    assert!(!temp.path().join("dataset").exists());
}

#[test]
fn custom_names_reach_the_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let captures = temp.path().join("captures");
    write_passes(&captures.join("3001_brick"), 4, 1);
    let output = temp.path().join("dataset");

    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg(&captures)
        .args([
            "--min-clusters",
            "1",
            "--split-suffix",
            "",
            "--dataset-name",
            "sorter",
            "--manifest",
            "data.yaml",
        ])
        .arg("--output")
        .arg(&output);
    cmd.assert().success();

    let manifest = std::fs::read_to_string(output.join("data.yaml")).unwrap();
    assert!(manifest.contains("train: sorter/images/train\n"));
    assert!(output.join("images/val/3001_brick").is_dir());
}

#[test]
fn box_stats_reports_without_exporting() {
    let temp = tempfile::tempdir().unwrap();
    let captures = temp.path().join("captures");
    write_passes(&captures.join("3001_brick"), 4, 2);
    let output = temp.path().join("dataset");

    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg(&captures).arg("--box-stats").arg("--output").arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Box statistics over 8 captures"))
        .stdout(predicate::str::contains("width: no values"))
        .stdout(predicate::str::contains("left: 8 values, min 10, max 10"))
        .stdout(predicate::str::contains("  0 below 10 (p2)"));
    assert!(!output.exists());
}

#[test]
fn box_stats_json_lists_fields() {
    let temp = tempfile::tempdir().unwrap();
    let captures = temp.path().join("captures");
    write_passes(&captures.join("3001_brick"), 3, 1);

    let mut cmd = Command::cargo_bin("brickset").unwrap();
    cmd.arg(&captures).args(["--box-stats", "--report", "json"]);
    let assert = cmd.assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["captures"], 3);
    assert_eq!(report["fields"][3]["field"], "right");
    assert_eq!(report["fields"][3]["max"], 20);
    assert_eq!(report["fields"][3]["high_outliers"], serde_json::json!([]));
}
