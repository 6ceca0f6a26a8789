//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build command for the fabprep-cli binary (finds it in target/debug when run via cargo test).
fn fabprep_cli() -> Command {
    cargo_bin_cmd!("fabprep-cli")
}

/// Path to fabprep library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fabprep")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = fabprep_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("JLCPCB"));
}

#[test]
fn test_cli_version() {
    let mut cmd = fabprep_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_convert_both_files() {
    let out = TempDir::new().unwrap();
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg(fixtures_dir().join("board-bom.csv"))
        .arg(fixtures_dir().join("board-all-pos.csv"))
        .arg("--out-dir")
        .arg(out.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("BOM and placement"));

    let bom = std::fs::read_to_string(out.path().join("board-bom_jlcpcb_bom.csv")).unwrap();
    assert!(bom.starts_with("Designator,Quantity,Value,Footprint,Part Number"));

    let cpl = std::fs::read_to_string(out.path().join("board-all-pos_jlcpcb_cpl.csv")).unwrap();
    let lines: Vec<&str> = cpl.lines().collect();
    assert_eq!(lines[0], "Designator,Mid X,Mid Y,Rotation,Layer");
    assert_eq!(lines[1], "C1,101.60mm,-52.07mm,270,top");
    assert_eq!(lines[3], "R1,110.01mm,-60.35mm,0,bottom");
}

#[test]
fn test_cli_convert_group_and_precision() {
    let out = TempDir::new().unwrap();
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg(fixtures_dir().join("board-bom.csv"))
        .arg(fixtures_dir().join("board-all-pos.csv"))
        .arg("--out-dir")
        .arg(out.path())
        .arg("--group")
        .arg("--precision")
        .arg("1");

    cmd.assert().success();

    let bom = std::fs::read_to_string(out.path().join("board-bom_jlcpcb_bom.csv")).unwrap();
    assert!(bom.contains("\"R1, R2\",2,10k"));

    let cpl = std::fs::read_to_string(out.path().join("board-all-pos_jlcpcb_cpl.csv")).unwrap();
    assert!(cpl.contains("C1,101.6mm,-52.1mm,270,top"));
}

#[test]
fn test_cli_convert_json_output() {
    let out = TempDir::new().unwrap();
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg(fixtures_dir().join("board-bom.csv"))
        .arg(fixtures_dir().join("netlist.csv"))
        .arg("--out-dir")
        .arg(out.path())
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["status"], "written");
    assert_eq!(files[0]["kind"], "bom");
    assert_eq!(files[1]["status"], "skipped");
    assert_eq!(json["summary"]["produced"], "BOM");
}

#[test]
fn test_cli_convert_reports_skipped_rows() {
    let out = TempDir::new().unwrap();
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg(fixtures_dir().join("export_semicolon.csv"))
        .arg("--out-dir")
        .arg(out.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("line 4"))
        .stdout(predicate::str::contains("Skipped:  0"));
}

#[test]
fn test_cli_convert_nothing_produced_fails() {
    let out = TempDir::new().unwrap();
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg(fixtures_dir().join("netlist.csv"))
        .arg(fixtures_dir().join("nofootprint-bom.csv"))
        .arg("--out-dir")
        .arg(out.path());

    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("No output files were produced"))
        .stdout(predicate::str::contains("footprint"));
}

#[test]
fn test_cli_convert_missing_file() {
    let out = TempDir::new().unwrap();
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg("does-not-exist-bom.csv")
        .arg("--out-dir")
        .arg(out.path());

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Skipped"));
}

#[test]
fn test_cli_convert_invalid_precision() {
    let mut cmd = fabprep_cli();

    cmd.arg("convert")
        .arg(fixtures_dir().join("board-bom.csv"))
        .arg("--precision")
        .arg("9");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("precision"));
}

#[test]
fn test_cli_convert_requires_paths() {
    let mut cmd = fabprep_cli();

    cmd.arg("convert");
    cmd.assert().failure();
}

#[test]
fn test_cli_convert_directory() {
    let work = TempDir::new().unwrap();
    for name in ["board-bom.csv", "board-all-pos.csv"] {
        std::fs::copy(fixtures_dir().join(name), work.path().join(name)).unwrap();
    }
    let mut cmd = fabprep_cli();

    cmd.arg("convert").arg(work.path());
    cmd.assert().success();

    assert!(work.path().join("board-bom_jlcpcb_bom.csv").exists());
    assert!(work.path().join("board-all-pos_jlcpcb_cpl.csv").exists());
}

#[test]
fn test_cli_inspect_placement() {
    let mut cmd = fabprep_cli();

    cmd.arg("inspect").arg(fixtures_dir().join("export_semicolon.csv"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("semicolon"))
        .stdout(predicate::str::contains("placement (from headers)"))
        .stdout(predicate::str::contains("rotation"));
}

#[test]
fn test_cli_inspect_json() {
    let mut cmd = fabprep_cli();

    cmd.arg("inspect")
        .arg(fixtures_dir().join("board-bom.csv"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "bom");
    assert_eq!(json["kind_from_name"], "bom");
    assert_eq!(json["mapping"]["part_number"], "Mfg Part #");
    assert_eq!(json["ignored"][0], "Designation");
}

#[test]
fn test_cli_inspect_missing_required() {
    let mut cmd = fabprep_cli();

    cmd.arg("inspect").arg(fixtures_dir().join("nofootprint-bom.csv"));

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Missing required: footprint"));
}

#[test]
fn test_cli_inspect_unknown_type() {
    let mut cmd = fabprep_cli();

    cmd.arg("inspect").arg(fixtures_dir().join("netlist.csv"));

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("unknown"));
}

#[test]
fn test_cli_fields() {
    let mut cmd = fabprep_cli();

    cmd.arg("fields").arg("--kind").arg("placement");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("placement fields"))
        .stdout(predicate::str::contains("posx"))
        .stdout(predicate::str::contains("BOM fields").not());
}
