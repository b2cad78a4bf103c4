use crate::error::SynthError;
use crate::signal::{ReferenceStats, Series};
use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::{SystemTime, UNIX_EPOCH};

/// Target length of a synthetic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesLength {
    Count(usize),
    Minutes(f64),
}

/// Sine-plus-noise model, optionally calibrated to a real recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthParams {
    /// When present, the sine amplitude becomes `reference.std` and `reference.mean` is added as DC.
    pub reference: Option<ReferenceStats>,
    pub length: SeriesLength,
    pub sampling_rate: f64,
    pub signal_frequency: f64,
    pub amplitude: f64,
    /// Noise standard deviation as a fraction of the signal amplitude.
    pub noise_fraction: f64,
    /// Symmetric clipping bound.
    pub clip: Option<f64>,
    pub max_samples: usize,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            reference: None,
            length: SeriesLength::Count(1000),
            sampling_rate: 1000.0,
            signal_frequency: 50.0,
            amplitude: 1.0,
            noise_fraction: 0.2,
            clip: None,
            max_samples: 10_000_000,
        }
    }
}

impl SynthParams {
    /// Number of samples this configuration asks for.
    pub fn sample_count(&self) -> Result<usize, SynthError> {
        match self.length {
            SeriesLength::Count(count) => Ok(count),
            SeriesLength::Minutes(minutes) => {
                if !(minutes.is_finite() && minutes >= 0.0) {
                    return Err(SynthError::InvalidInput(format!(
                        "duration must be a non-negative number of minutes, got {}",
                        minutes
                    )));
                }
                let count = (minutes * 60.0 * self.sampling_rate).round();
                if count > self.max_samples as f64 {
                    return Err(SynthError::TooLarge {
                        requested: count.min(usize::MAX as f64) as usize,
                        limit: self.max_samples,
                    });
                }
                Ok(count as usize)
            }
        }
    }

    fn validate(&self) -> Result<(), SynthError> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(SynthError::InvalidInput(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate
            )));
        }
        if !(self.noise_fraction.is_finite() && self.noise_fraction >= 0.0) {
            return Err(SynthError::InvalidInput(format!(
                "noise fraction must be non-negative, got {}",
                self.noise_fraction
            )));
        }
        if let Some(clip) = self.clip {
            if !(clip.is_finite() && clip > 0.0) {
                return Err(SynthError::InvalidInput(format!(
                    "clip bound must be positive, got {}",
                    clip
                )));
            }
        }
        Ok(())
    }
}

/// Synthesize a series ending at the current wall-clock time.
pub fn synthesize<R: Rng + ?Sized>(params: &SynthParams, rng: &mut R) -> Result<Series, SynthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs_f64())
        .unwrap_or(0.0);
    synthesize_at(params, now, rng)
}

/// Synthesize a series whose last timestamp is `now` (seconds since the epoch).
pub fn synthesize_at<R: Rng + ?Sized>(
    params: &SynthParams,
    now: f64,
    rng: &mut R,
) -> Result<Series, SynthError> {
    params.validate()?;
    let count = params.sample_count()?;
    if count > params.max_samples {
        return Err(SynthError::TooLarge {
            requested: count,
            limit: params.max_samples,
        });
    }
    let fs = params.sampling_rate;
    let (amplitude, offset) = match params.reference {
        Some(stats) => (stats.std, stats.mean),
        None => (params.amplitude, 0.0),
    };
    let noise_std = (params.noise_fraction * amplitude).abs();
    let noise = Normal::new(0.0, noise_std)
        .map_err(|err| SynthError::InvalidInput(format!("noise level {}: {}", noise_std, err)))?;

    let start = now - count.saturating_sub(1) as f64 / fs;
    let mut timestamps = Vec::with_capacity(count);
    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f64 / fs;
        let mut value =
            amplitude * (2.0 * PI * params.signal_frequency * t).sin() + offset + noise.sample(rng);
        if let Some(bound) = params.clip {
            value = value.clamp(-bound, bound);
        }
        timestamps.push(start + t);
        values.push(value);
    }
    debug!(
        "synthesized {} samples at {} Hz (amplitude {}, noise std {})",
        count, fs, amplitude, noise_std
    );
    Ok(Series {
        fs,
        timestamps,
        values,
    })
}
