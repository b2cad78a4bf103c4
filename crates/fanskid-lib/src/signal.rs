use serde::{Deserialize, Serialize};

/// Uniformly sampled scalar series with absolute timestamps (seconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Nominal sampling frequency in Hz. Supplied by the caller, never inferred.
    pub fs: f64,
    pub timestamps: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    /// Build a series whose timestamps start at zero and step by `1 / fs`.
    pub fn from_values(fs: f64, values: Vec<f64>) -> Self {
        let timestamps = (0..values.len()).map(|i| i as f64 / fs).collect();
        Self {
            fs,
            timestamps,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.values.len() as f64 / self.fs
    }

    pub fn reference_stats(&self) -> Option<ReferenceStats> {
        ReferenceStats::from_values(&self.values)
    }
}

/// Mean and standard deviation of a real recording, used to calibrate synthetic data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStats {
    pub mean: f64,
    pub std: f64,
}

impl ReferenceStats {
    /// Sample statistics (ddof = 1). `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n == 0 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Self { mean, std })
    }
}
