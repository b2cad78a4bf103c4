use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Deserialize)]
struct SpectrumOutput {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
}

fn sample_path(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative);
    root.to_string_lossy().to_string()
}

fn peak_frequency(spectrum: &SpectrumOutput) -> f64 {
    let (idx, _) = spectrum
        .magnitudes
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .expect("non-empty spectrum");
    spectrum.frequencies[idx]
}

#[test]
fn spectrum_from_stdin_finds_tone() -> Result<(), Box<dyn Error>> {
    let tone = std::fs::read_to_string(sample_path("test_data/tone_50hz.txt"))?;
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["spectrum", "--fs", "1000"]).write_stdin(tone);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: SpectrumOutput = serde_json::from_slice(&out)?;
    assert_eq!(value.frequencies.len(), 512);
    assert_eq!(value.magnitudes.len(), 512);
    assert!((peak_frequency(&value) - 50.0).abs() <= 1000.0 / 1024.0);
    Ok(())
}

#[test]
fn spectrum_from_sensor_file_respects_cutoff() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args([
        "spectrum",
        "--input",
        &sample_path("test_data/fanskid_sample.tsv"),
        "--column",
        "bearing_block",
        "--fs",
        "1000",
        "--window",
        "hann",
        "--zero-padding",
        "2",
        "--max-frequency",
        "250",
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: SpectrumOutput = serde_json::from_slice(&out)?;
    assert_eq!(value.frequencies.len(), 257);
    assert!(value.frequencies.iter().all(|f| *f <= 250.0));
    assert!((peak_frequency(&value) - 125.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn missing_input_yields_empty_spectrum() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["spectrum", "--input", "/nonexistent/path"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: SpectrumOutput = serde_json::from_slice(&out)?;
    assert!(value.frequencies.is_empty());
    assert!(value.magnitudes.is_empty());
    Ok(())
}

#[test]
fn empty_input_yields_empty_spectrum() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args(["spectrum", "--input", &sample_path("test_data/empty.tsv")]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: SpectrumOutput = serde_json::from_slice(&out)?;
    assert!(value.frequencies.is_empty());
    Ok(())
}

#[test]
fn non_positive_sampling_rate_is_rejected() {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args([
        "spectrum",
        "--values",
        &sample_path("test_data/tone_50hz.txt"),
        "--fs",
        "0",
    ]);
    cmd.assert().failure();
}

#[test]
fn unknown_column_is_rejected() {
    let mut cmd = cargo_bin_cmd!("fanskid");
    cmd.args([
        "spectrum",
        "--input",
        &sample_path("test_data/fanskid_sample.tsv"),
        "--column",
        "rotor",
    ]);
    cmd.assert().failure();
}
