use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;

fn fleet_path() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("test_data/fleet.toml")
        .to_string_lossy()
        .to_string()
}

#[test]
fn summary_view_lists_fleet() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["summary", "--config", &fleet_path()]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&out)?;
    assert_eq!(report["view"], "summary");
    let devices = report["devices"].as_array().expect("devices array");
    assert_eq!(devices.len(), 3);

    assert_eq!(devices[0]["id"], "FS-101");
    assert_eq!(devices[0]["summary"]["n"], 512);
    let f0 = devices[0]["dominant_frequency"].as_f64().unwrap();
    assert!((f0 - 62.5).abs() < 1e-9);

    assert_eq!(devices[1]["column"], "bearing_block");
    let f1 = devices[1]["dominant_frequency"].as_f64().unwrap();
    assert!((f1 - 125.0).abs() < 1e-9);

    assert_eq!(devices[2]["summary"]["n"], 0);
    assert!(devices[2]["dominant_frequency"].is_null());
    assert!(devices[2]["warning"]
        .as_str()
        .map(|w| w.contains("no rows"))
        .unwrap_or(false));
    Ok(())
}

#[test]
fn device_view_reports_channels_and_spectrum() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["device", "--config", &fleet_path(), "--id", "FS-102"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&out)?;
    assert_eq!(report["view"], "detail");
    assert_eq!(report["device"]["id"], "FS-102");
    let channels = report["channels"].as_array().unwrap();
    let names: Vec<&str> = channels
        .iter()
        .filter_map(|c| c["column"].as_str())
        .collect();
    assert_eq!(names, ["reading", "bearing_block", "driven_pulley"]);
    let freqs = report["spectrum"]["frequencies"].as_array().unwrap();
    assert_eq!(freqs.len(), 257);
    Ok(())
}

#[test]
fn unknown_device_fails() {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["device", "--config", &fleet_path(), "--id", "FS-999"]);
    cmd.assert().failure();
}

#[test]
fn summary_view_filters_selected_devices() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args([
        "summary",
        "--config",
        &fleet_path(),
        "--id",
        "FS-102",
        "--id",
        "FS-101",
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&out)?;
    let ids: Vec<&str> = report["devices"]
        .as_array()
        .expect("devices array")
        .iter()
        .filter_map(|d| d["id"].as_str())
        .collect();
    assert_eq!(ids, ["FS-102", "FS-101"]);
    Ok(())
}

#[test]
fn summary_with_unknown_id_fails() {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["summary", "--config", &fleet_path(), "--id", "FS-999"]);
    let out = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&out).contains("FS-999"));
}
