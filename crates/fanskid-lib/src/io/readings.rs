use crate::error::LoadError;
use crate::signal::Series;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Column layout of the fanskid sensor export (tab separated, no header).
pub const DEFAULT_COLUMNS: [&str; 3] = ["reading", "bearing_block", "driven_pulley"];

/// Sensor records held column-wise. An empty table still carries its column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorTable {
    pub names: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl SensorTable {
    pub fn empty(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            columns: vec![Vec::new(); names.len()],
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Series view of one column at the externally supplied sampling rate.
    pub fn series(&self, name: &str, fs: f64) -> Option<Series> {
        self.column(name)
            .map(|values| Series::from_values(fs, values.to_vec()))
    }
}

/// Load a headerless, tab-delimited sensor file into named columns.
pub fn load_sensor_table(path: &Path, names: &[&str]) -> Result<SensorTable, LoadError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(err),
    })?;
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(file);
    let mut table = SensorTable::empty(names);
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let fields = split_fields(&record);
        if fields.is_empty() {
            continue;
        }
        if fields.len() != names.len() {
            return Err(LoadError::Malformed {
                line,
                message: format!("expected {} columns, found {}", names.len(), fields.len()),
            });
        }
        for (column, field) in table.columns.iter_mut().zip(fields) {
            let value = field.parse::<f64>().map_err(|_| LoadError::Malformed {
                line,
                message: format!("'{}' is not a number", field),
            })?;
            column.push(value);
        }
    }
    if table.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    debug!("loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Like [`load_sensor_table`] but never fails: on any error the caller gets an
/// empty, correctly-shaped table together with the classified error.
pub fn load_sensor_table_or_empty(
    path: &Path,
    names: &[&str],
) -> (SensorTable, Option<LoadError>) {
    match load_sensor_table(path, names) {
        Ok(table) => (table, None),
        Err(err) => {
            warn!("{}; continuing with an empty table", err);
            (SensorTable::empty(names), Some(err))
        }
    }
}

// Space-aligned exports arrive as one tab-free field per row.
fn split_fields(record: &StringRecord) -> Vec<&str> {
    if record.len() == 1 {
        record
            .get(0)
            .map(|field| field.split_whitespace().collect())
            .unwrap_or_default()
    } else {
        record.iter().collect()
    }
}
