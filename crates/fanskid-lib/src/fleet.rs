use crate::io::readings::DEFAULT_COLUMNS;
use crate::spectrum::{SpectrumOptions, Window};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Analysis defaults shared by every device in the fleet file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSpec {
    pub sampling_rate: f64,
    pub window: Window,
    pub zero_padding: usize,
    pub max_frequency: Option<f64>,
    pub normalize: bool,
}

impl Default for AnalysisSpec {
    fn default() -> Self {
        Self {
            sampling_rate: 1000.0,
            window: Window::Hann,
            zero_padding: 1,
            max_frequency: None,
            normalize: false,
        }
    }
}

impl AnalysisSpec {
    pub fn spectrum_options(&self) -> SpectrumOptions {
        SpectrumOptions {
            window: self.window,
            zero_padding: self.zero_padding,
            max_frequency: self.max_frequency,
            normalize: self.normalize,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub path: PathBuf,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub sampling_rate: Option<f64>,
}

impl DeviceSpec {
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(DEFAULT_COLUMNS[0])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub analysis: AnalysisSpec,
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
}

impl FleetConfig {
    /// Read a fleet file; relative device paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read fleet config {}", path.display()))?;
        let mut config = Self::from_toml(&contents)
            .with_context(|| format!("parsing fleet config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for device in &mut config.devices {
            if device.path.is_relative() {
                device.path = base.join(&device.path);
            }
        }
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: FleetConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn device(&self, id: &str) -> Option<&DeviceSpec> {
        self.devices.iter().find(|device| device.id == id)
    }

    pub fn sampling_rate_for(&self, device: &DeviceSpec) -> f64 {
        device.sampling_rate.unwrap_or(self.analysis.sampling_rate)
    }

    fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        check_sampling_rate(analysis.sampling_rate).context("invalid [analysis] sampling_rate")?;
        if analysis.zero_padding == 0 {
            bail!("[analysis] zero_padding must be at least 1");
        }
        if let Some(max) = analysis.max_frequency {
            if max.is_nan() || max < 0.0 {
                bail!("[analysis] max_frequency must be non-negative, got {}", max);
            }
        }
        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.id.trim().is_empty() {
                bail!("device ids must not be empty");
            }
            if !seen.insert(device.id.as_str()) {
                bail!("duplicate device id '{}'", device.id);
            }
            if !DEFAULT_COLUMNS
                .iter()
                .any(|c| c.eq_ignore_ascii_case(device.column()))
            {
                bail!(
                    "device '{}' uses unknown column '{}' (expected one of {:?})",
                    device.id,
                    device.column(),
                    DEFAULT_COLUMNS
                );
            }
            if let Some(fs) = device.sampling_rate {
                check_sampling_rate(fs).with_context(|| {
                    format!("device '{}' has an invalid sampling_rate", device.id)
                })?;
            }
        }
        Ok(())
    }
}

fn check_sampling_rate(fs: f64) -> Result<()> {
    if !(fs.is_finite() && fs > 0.0) {
        bail!("sampling rate must be positive, got {}", fs);
    }
    Ok(())
}
