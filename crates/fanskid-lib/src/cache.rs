use crate::error::SpectrumError;
use crate::spectrum::{compute_spectrum, Spectrum, SpectrumOptions};
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

/// Bounded least-recently-used cache in front of [`compute_spectrum`],
/// keyed by a hash of the samples, the sampling rate and the options.
#[derive(Debug, Default)]
pub struct SpectrumCache {
    capacity: usize,
    entries: HashMap<u64, Spectrum>,
    order: VecDeque<u64>,
    hits: u64,
    misses: u64,
}

impl SpectrumCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn get_or_compute(
        &mut self,
        values: &[f64],
        fs: f64,
        opts: &SpectrumOptions,
    ) -> Result<Spectrum, SpectrumError> {
        let key = cache_key(values, fs, opts);
        if let Some(hit) = self.entries.get(&key) {
            let hit = hit.clone();
            self.hits += 1;
            self.touch(key);
            return Ok(hit);
        }
        self.misses += 1;
        let spectrum = compute_spectrum(values, fs, opts)?;
        if self.capacity > 0 {
            if self.entries.len() >= self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.entries.remove(&evicted);
                    debug!("spectrum cache evicted {:016x}", evicted);
                }
            }
            self.entries.insert(key, spectrum.clone());
            self.order.push_back(key);
        }
        Ok(spectrum)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }
}

fn cache_key(values: &[f64], fs: f64, opts: &SpectrumOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    values.len().hash(&mut hasher);
    for v in values {
        v.to_bits().hash(&mut hasher);
    }
    fs.to_bits().hash(&mut hasher);
    opts.window.hash(&mut hasher);
    opts.zero_padding.hash(&mut hasher);
    opts.max_frequency.map(f64::to_bits).hash(&mut hasher);
    opts.normalize.hash(&mut hasher);
    hasher.finish()
}
