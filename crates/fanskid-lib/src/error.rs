use std::path::PathBuf;
use thiserror::Error;

/// Failure to read sensor records. `NotFound` and `Empty` are recoverable:
/// callers substitute an empty table and keep going.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("data file {} contains no rows", .0.display())]
    Empty(PathBuf),
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("reading sensor records")]
    Csv(#[from] csv::Error),
    #[error("reading sensor records")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// True for the two conditions the dashboard treats as "no data yet".
    pub fn is_missing_data(&self) -> bool {
        matches!(self, LoadError::NotFound(_) | LoadError::Empty(_))
    }
}

#[derive(Debug, Error)]
pub enum SpectrumError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fft failed: {0}")]
    Transform(#[from] realfft::FftError),
}

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("requested {requested} samples, limit is {limit}")]
    TooLarge { requested: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("unknown device '{0}'")]
    UnknownDevice(String),
    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}
