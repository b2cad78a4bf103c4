use crate::error::SpectrumError;
use log::debug;
use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tapering applied to the sample block before the transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    #[default]
    Rectangular,
    Hann,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumOptions {
    pub window: Window,
    /// Integer multiplier on the sample count, reached by appending zeros.
    pub zero_padding: usize,
    /// Upper frequency bound in Hz; `None` keeps every sub-Nyquist bin.
    pub max_frequency: Option<f64>,
    /// Divide samples by their peak absolute value before transforming.
    pub normalize: bool,
}

impl Default for SpectrumOptions {
    fn default() -> Self {
        Self {
            window: Window::Rectangular,
            zero_padding: 1,
            max_frequency: None,
            normalize: false,
        }
    }
}

/// One-sided magnitude spectrum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Strongest bin as `(frequency, magnitude)`, searched past the lobe that
    /// falls away from 0 Hz so a DC offset does not mask the running frequency.
    /// When the whole spectrum is that lobe the DC bin itself is returned.
    pub fn dominant_peak(&self) -> Option<(f64, f64)> {
        let lobe_end = self
            .magnitudes
            .windows(2)
            .position(|w| w[1] > w[0])
            .unwrap_or(0);
        self.frequencies
            .iter()
            .zip(&self.magnitudes)
            .skip(lobe_end)
            .filter(|(_, m)| !m.is_nan())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(f, m)| (*f, *m))
    }

    pub fn points(&self) -> Vec<[f64; 2]> {
        self.frequencies
            .iter()
            .zip(&self.magnitudes)
            .map(|(f, m)| [*f, *m])
            .collect()
    }
}

/// Hann coefficients `0.5 * (1 - cos(2πi / (n - 1)))`; a single sample gets weight 1.
pub fn hann_window(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
        .collect()
}

/// Scale samples by their peak absolute value. All-zero input is returned unchanged.
pub fn normalize_peak(values: &[f64]) -> Vec<f64> {
    let peak = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if peak == 0.0 {
        return values.to_vec();
    }
    values.iter().map(|v| v / peak).collect()
}

/// Compute the one-sided magnitude spectrum of `values` sampled at `fs` Hz.
///
/// Magnitudes are raw `|X[k]|`: no division by the sample count and no dB
/// conversion. Bins run from 0 Hz up to (excluding) Nyquist, then the
/// optional `max_frequency` cutoff is applied.
pub fn compute_spectrum(
    values: &[f64],
    fs: f64,
    opts: &SpectrumOptions,
) -> Result<Spectrum, SpectrumError> {
    if values.is_empty() {
        return Ok(Spectrum::default());
    }
    validate(fs, opts)?;
    let n = values.len();
    let padded_len = n.checked_mul(opts.zero_padding).ok_or_else(|| {
        SpectrumError::InvalidInput(format!(
            "{} samples with zero padding {} overflows",
            n, opts.zero_padding
        ))
    })?;

    let mut buffer = if opts.normalize {
        normalize_peak(values)
    } else {
        values.to_vec()
    };
    if opts.window == Window::Hann {
        for (sample, w) in buffer.iter_mut().zip(hann_window(n)) {
            *sample *= w;
        }
    }
    buffer.resize(padded_len, 0.0);

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(padded_len);
    let mut output = r2c.make_output_vec();
    r2c.process(&mut buffer, &mut output)?;

    let bins = padded_len / 2;
    let bin_width = fs / padded_len as f64;
    let limit = opts.max_frequency.unwrap_or(f64::INFINITY);
    let mut spectrum = Spectrum {
        frequencies: Vec::with_capacity(bins),
        magnitudes: Vec::with_capacity(bins),
    };
    for (k, coeff) in output.iter().take(bins).enumerate() {
        let freq = k as f64 * bin_width;
        if freq > limit {
            break;
        }
        spectrum.frequencies.push(freq);
        spectrum.magnitudes.push(coeff.norm());
    }
    debug!(
        "spectrum: {} samples, padded to {}, kept {} of {} bins",
        n,
        padded_len,
        spectrum.len(),
        bins
    );
    Ok(spectrum)
}

fn validate(fs: f64, opts: &SpectrumOptions) -> Result<(), SpectrumError> {
    if !(fs.is_finite() && fs > 0.0) {
        return Err(SpectrumError::InvalidInput(format!(
            "sampling rate must be positive, got {}",
            fs
        )));
    }
    if opts.zero_padding == 0 {
        return Err(SpectrumError::InvalidInput(
            "zero padding factor must be at least 1".into(),
        ));
    }
    if let Some(max) = opts.max_frequency {
        if max.is_nan() || max < 0.0 {
            return Err(SpectrumError::InvalidInput(format!(
                "max frequency must be non-negative, got {}",
                max
            )));
        }
    }
    Ok(())
}
