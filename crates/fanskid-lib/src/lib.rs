pub mod cache;
pub mod dashboard;
pub mod error;
pub mod fleet;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod signal;
pub mod spectrum;
pub mod synth;

pub use error::*;
pub use signal::*;
pub use spectrum::{compute_spectrum, Spectrum, SpectrumOptions, Window};
