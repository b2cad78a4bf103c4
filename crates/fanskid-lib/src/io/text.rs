use crate::error::LoadError;
use std::path::{Path, PathBuf};

/// Parse newline-delimited floating point samples, ignoring blank/comment lines.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>, LoadError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed.parse().map_err(|_| LoadError::Malformed {
            line: idx + 1,
            message: format!("not a number: {}", trimmed),
        })?;
        out.push(val);
    }
    if out.is_empty() {
        return Err(LoadError::Empty(PathBuf::from("-")));
    }
    Ok(out)
}

/// Read a newline-delimited floating point series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(err),
    })?;
    parse_f64_series(&text).map_err(|err| match err {
        LoadError::Empty(_) => LoadError::Empty(path.to_path_buf()),
        other => other,
    })
}
