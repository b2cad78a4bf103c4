use serde::{Deserialize, Serialize};

/// Time-domain condition indicators for one sensor channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    pub rms: f64,
    pub peak_to_peak: f64,
    pub crest_factor: f64,
    pub kurtosis: f64,
}

pub fn summarize(values: &[f64]) -> SeriesSummary {
    let n = values.len();
    if n == 0 {
        return SeriesSummary::default();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)).sqrt()
    } else {
        0.0
    };
    let rms = (values.iter().map(|x| x * x).sum::<f64>() / n as f64).sqrt();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let peak = min.abs().max(max.abs());
    let crest_factor = if rms > 0.0 { peak / rms } else { 0.0 };
    SeriesSummary {
        n,
        mean,
        std,
        rms,
        peak_to_peak: max - min,
        crest_factor,
        kurtosis: kurtosis(values, mean),
    }
}

fn kurtosis(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    let m2 = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return 0.0;
    }
    let m4 = values.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / n;
    m4 / (m2 * m2)
}
