//! Signal processing module - RMS and spectral analysis of vibration batches

mod spectral;

pub use spectral::{analyze, compute_spectrum, dominant_frequency, rms, Spectrum};
