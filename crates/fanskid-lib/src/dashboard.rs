//! Summary and per-device detail views over a fleet of monitored fanskids.
//!
//! Navigation is explicit: callers pass a [`View`] to [`Dashboard::render`]
//! instead of toggling a "selected device" flag.

use crate::cache::SpectrumCache;
use crate::error::DashboardError;
use crate::fleet::{DeviceSpec, FleetConfig};
use crate::io::readings::{load_sensor_table_or_empty, SensorTable, DEFAULT_COLUMNS};
use crate::metrics::vibration::{summarize, SeriesSummary};
use crate::spectrum::Spectrum;
use log::info;
use serde::Serialize;
use std::collections::HashMap;

const DEFAULT_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Rows for the selected device ids, or the whole fleet when `None`.
    Summary { devices: Option<Vec<String>> },
    Detail(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceRow {
    pub id: String,
    pub name: Option<String>,
    pub column: String,
    pub fs: f64,
    pub summary: SeriesSummary,
    pub dominant_frequency: Option<f64>,
    pub dominant_magnitude: Option<f64>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub column: String,
    pub summary: SeriesSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub devices: Vec<DeviceRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailReport {
    pub device: DeviceRow,
    pub channels: Vec<ChannelSummary>,
    pub spectrum: Spectrum,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Report {
    Summary(SummaryReport),
    Detail(DetailReport),
}

struct LoadedDevice {
    table: SensorTable,
    warning: Option<String>,
}

pub struct Dashboard {
    config: FleetConfig,
    cache: SpectrumCache,
    tables: HashMap<String, LoadedDevice>,
}

impl Dashboard {
    pub fn new(config: FleetConfig) -> Self {
        Self::with_cache_capacity(config, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(config: FleetConfig, capacity: usize) -> Self {
        Self {
            config,
            cache: SpectrumCache::new(capacity),
            tables: HashMap::new(),
        }
    }

    pub fn cache(&self) -> &SpectrumCache {
        &self.cache
    }

    pub fn render(&mut self, view: &View) -> Result<Report, DashboardError> {
        match view {
            View::Summary { devices } => self.summary(devices.as_deref()).map(Report::Summary),
            View::Detail(id) => self.detail(id).map(Report::Detail),
        }
    }

    /// Summary rows in selection order; every id must be configured.
    pub fn summary(&mut self, ids: Option<&[String]>) -> Result<SummaryReport, DashboardError> {
        let devices = match ids {
            None => self.config.devices.clone(),
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.config
                        .device(id)
                        .cloned()
                        .ok_or_else(|| DashboardError::UnknownDevice(id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        let mut rows = Vec::with_capacity(devices.len());
        for device in &devices {
            let (row, _) = self.analyse(device)?;
            rows.push(row);
        }
        info!("rendered summary for {} device(s)", rows.len());
        Ok(SummaryReport { devices: rows })
    }

    pub fn detail(&mut self, id: &str) -> Result<DetailReport, DashboardError> {
        let device = self
            .config
            .device(id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownDevice(id.to_string()))?;
        let (row, spectrum) = self.analyse(&device)?;
        let table = &self.loaded(&device).table;
        let channels = DEFAULT_COLUMNS
            .iter()
            .map(|column| ChannelSummary {
                column: column.to_string(),
                summary: summarize(table.column(column).unwrap_or(&[])),
            })
            .collect();
        info!("rendered detail for device {}", id);
        Ok(DetailReport {
            device: row,
            channels,
            spectrum,
        })
    }

    fn analyse(&mut self, device: &DeviceSpec) -> Result<(DeviceRow, Spectrum), DashboardError> {
        let fs = self.config.sampling_rate_for(device);
        let opts = self.config.analysis.spectrum_options();
        let (values, warning) = {
            let loaded = self.loaded(device);
            (
                loaded
                    .table
                    .column(device.column())
                    .map(<[f64]>::to_vec)
                    .unwrap_or_default(),
                loaded.warning.clone(),
            )
        };
        let spectrum = self.cache.get_or_compute(&values, fs, &opts)?;
        let peak = spectrum.dominant_peak();
        let row = DeviceRow {
            id: device.id.clone(),
            name: device.name.clone(),
            column: device.column().to_string(),
            fs,
            summary: summarize(&values),
            dominant_frequency: peak.map(|(f, _)| f),
            dominant_magnitude: peak.map(|(_, m)| m),
            warning,
        };
        Ok((row, spectrum))
    }

    fn loaded(&mut self, device: &DeviceSpec) -> &LoadedDevice {
        self.tables.entry(device.id.clone()).or_insert_with(|| {
            let (table, err) = load_sensor_table_or_empty(&device.path, &DEFAULT_COLUMNS);
            LoadedDevice {
                table,
                warning: err.map(|e| e.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use std::fmt::Write as _;
    use std::fs;

    fn write_device_file(dir: &std::path::Path, name: &str, f0: f64, fs: f64) {
        let mut text = String::new();
        for i in 0..512 {
            let t = i as f64 / fs;
            let v = (2.0 * PI * f0 * t).sin();
            writeln!(text, "{}\t{}\t{}", v, 0.5 * v, 0.1).unwrap();
        }
        fs::write(dir.join(name), text).unwrap();
    }

    fn fleet(dir: &std::path::Path) -> FleetConfig {
        write_device_file(dir, "fs101.tsv", 62.5, 1000.0);
        let toml = r#"
[analysis]
sampling_rate = 1000.0
window = "rectangular"

[[devices]]
id = "FS-101"
name = "Supply fan"
path = "fs101.tsv"

[[devices]]
id = "FS-102"
path = "missing.tsv"
"#;
        let path = dir.join("fleet.toml");
        fs::write(&path, toml).unwrap();
        FleetConfig::load(&path).unwrap()
    }

    #[test]
    fn summary_lists_every_device_and_survives_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = Dashboard::new(fleet(dir.path()));
        let report = dashboard.summary(None).unwrap();
        assert_eq!(report.devices.len(), 2);
        let ok = &report.devices[0];
        assert_eq!(ok.summary.n, 512);
        assert!((ok.dominant_frequency.unwrap() - 62.5).abs() < 1e-9);
        assert!(ok.warning.is_none());
        let missing = &report.devices[1];
        assert_eq!(missing.summary.n, 0);
        assert!(missing.dominant_frequency.is_none());
        assert!(missing.warning.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn drilling_into_detail_reuses_the_cached_spectrum() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = Dashboard::new(fleet(dir.path()));
        dashboard.render(&View::Summary { devices: None }).unwrap();
        let report = dashboard
            .render(&View::Detail("FS-101".into()))
            .unwrap();
        match report {
            Report::Detail(detail) => {
                assert_eq!(detail.device.id, "FS-101");
                assert_eq!(detail.channels.len(), 3);
                assert_eq!(detail.spectrum.len(), 256);
                assert!((detail.channels[2].summary.mean - 0.1).abs() < 1e-12);
            }
            Report::Summary(_) => panic!("expected detail view"),
        }
        assert!(dashboard.cache().hits() >= 1);
    }

    #[test]
    fn summary_can_be_limited_to_selected_devices() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = Dashboard::new(fleet(dir.path()));
        let view = View::Summary {
            devices: Some(vec!["FS-102".into()]),
        };
        match dashboard.render(&view).unwrap() {
            Report::Summary(report) => {
                assert_eq!(report.devices.len(), 1);
                assert_eq!(report.devices[0].id, "FS-102");
            }
            Report::Detail(_) => panic!("expected summary view"),
        }
        let none = dashboard.summary(Some(Vec::new().as_slice())).unwrap();
        assert!(none.devices.is_empty());
        let ids = vec!["FS-101".to_string(), "FS-999".to_string()];
        let err = dashboard.summary(Some(ids.as_slice())).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownDevice(id) if id == "FS-999"));
    }

    #[test]
    fn unknown_device_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = Dashboard::new(fleet(dir.path()));
        let err = dashboard.render(&View::Detail("nope".into())).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownDevice(id) if id == "nope"));
    }
}
