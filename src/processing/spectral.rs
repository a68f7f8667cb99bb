//! RMS and dominant-frequency extraction using rustfft
//!
//! # Example
//!
//! ```ignore
//! use vibration_monitor::processing::analyze;
//!
//! let request = vibration_monitor::acquisition::decode(payload)?;
//! let result = analyze(&request)?;
//! println!("{:.3} g RMS at {:.1} Hz", result.rms, result.dominant_frequency);
//! ```

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::pipeline::PipelineError;
use crate::types::{AnalysisRequest, AnalysisResult};

// ============================================================================
// Time Domain
// ============================================================================

/// Root-mean-square of a signal. Returns 0.0 for an empty slice.
pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = signal.iter().map(|x| x * x).sum();
    (sum_squares / signal.len() as f64).sqrt()
}

// ============================================================================
// Frequency Domain
// ============================================================================

/// One-sided magnitude spectrum of a real signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin centre frequencies (Hz), starting at DC
    pub frequencies: Vec<f64>,
    /// Unscaled DFT magnitude per bin
    pub magnitudes: Vec<f64>,
    /// Width of one bin (Hz) = sampling_rate / n
    pub resolution: f64,
}

impl Spectrum {
    /// Frequency of the strongest bin. Ties go to the lowest bin.
    ///
    /// The DC bin takes part in the search, so a signal with a large offset
    /// reports 0 Hz.
    pub fn dominant_frequency(&self) -> f64 {
        let mut best = 0;
        for (i, &m) in self.magnitudes.iter().enumerate() {
            if m > self.magnitudes[best] {
                best = i;
            }
        }
        self.frequencies.get(best).copied().unwrap_or(0.0)
    }
}

/// Compute the one-sided spectrum of `samples`.
///
/// The transform runs at the native length n (no zero padding) and keeps the
/// first `n / 2` bins. A single sample yields one DC bin.
pub fn compute_spectrum(samples: &[f64], sampling_rate: f64) -> Spectrum {
    let n = samples.len();
    if n == 0 {
        return Spectrum {
            frequencies: Vec::new(),
            magnitudes: Vec::new(),
            resolution: 0.0,
        };
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    let n_bins = (n / 2).max(1);
    let resolution = sampling_rate / n as f64;

    let frequencies = (0..n_bins).map(|k| k as f64 * resolution).collect();
    let magnitudes = buffer.iter().take(n_bins).map(|c| c.norm()).collect();

    Spectrum {
        frequencies,
        magnitudes,
        resolution,
    }
}

/// Dominant frequency of `samples` in Hz.
pub fn dominant_frequency(samples: &[f64], sampling_rate: f64) -> f64 {
    compute_spectrum(samples, sampling_rate).dominant_frequency()
}

// ============================================================================
// Analyzer
// ============================================================================

/// Analyze one validated batch.
///
/// # Errors
/// [`PipelineError::Analysis`] when the input overflows to a non-finite RMS or
/// spectrum (e.g. samples near `f64::MAX`).
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisResult, PipelineError> {
    let samples = request.samples();
    let sampling_rate = request.sampling_rate();

    let rms = rms(samples);
    if !rms.is_finite() {
        return Err(PipelineError::Analysis(format!(
            "RMS is not finite ({rms}) for {} samples",
            samples.len()
        )));
    }

    let spectrum = compute_spectrum(samples, sampling_rate);
    if spectrum.magnitudes.iter().any(|m| !m.is_finite()) {
        return Err(PipelineError::Analysis(
            "spectrum contains non-finite magnitudes".to_string(),
        ));
    }

    let dominant_frequency = spectrum.dominant_frequency();

    tracing::trace!(
        samples = samples.len(),
        sampling_rate,
        rms,
        dominant_frequency,
        resolution = spectrum.resolution,
        "Batch analyzed"
    );

    Ok(AnalysisResult {
        rms,
        dominant_frequency,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::decode;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f64, sampling_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sampling_rate).sin())
            .collect()
    }

    #[test]
    fn test_rms_of_zeros_is_zero() {
        assert_eq!(rms(&[0.0; 64]), 0.0);
    }

    #[test]
    fn test_rms_of_sine_is_amplitude_over_sqrt2() {
        // 50 full periods
        let signal = sine(50.0, 3.0, 1000.0, 1000);
        let expected = 3.0 / 2.0_f64.sqrt();
        assert!((rms(&signal) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_dominant_frequency_of_pure_tone() {
        let sampling_rate = 1000.0;
        let n = 1000;
        let signal = sine(120.0, 1.0, sampling_rate, n);
        let freq = dominant_frequency(&signal, sampling_rate);
        assert!((freq - 120.0).abs() <= sampling_rate / n as f64);
    }

    #[test]
    fn test_dominant_frequency_off_bin_is_within_one_bin() {
        // 256 samples at 1 kHz: bins are ~3.9 Hz wide, 50 Hz falls between two
        let sampling_rate = 1000.0;
        let n = 256;
        let signal = sine(50.0, 1.0, sampling_rate, n);
        let freq = dominant_frequency(&signal, sampling_rate);
        assert!(
            (freq - 50.0).abs() <= sampling_rate / n as f64,
            "Peak at {freq}, expected ~50 Hz"
        );
    }

    #[test]
    fn test_non_power_of_two_length() {
        let signal = sine(30.0, 1.0, 300.0, 300);
        let freq = dominant_frequency(&signal, 300.0);
        assert!((freq - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_spectrum_keeps_half_the_bins() {
        let spectrum = compute_spectrum(&[1.0; 10], 100.0);
        assert_eq!(spectrum.frequencies.len(), 5);
        assert_eq!(spectrum.magnitudes.len(), 5);
        assert!((spectrum.resolution - 10.0).abs() < 1e-12);
        assert_eq!(spectrum.frequencies[0], 0.0);
    }

    #[test]
    fn test_single_sample_does_not_fail() {
        let req = decode(r#"{"vibration_data":[0.7],"sampling_rate":100}"#).unwrap();
        let result = analyze(&req).unwrap();
        assert!((result.rms - 0.7).abs() < 1e-12);
        assert_eq!(result.dominant_frequency, 0.0);
    }

    #[test]
    fn test_dc_offset_reports_zero_hz() {
        // Strong offset dominates the 100 Hz tone because DC is searched
        let signal: Vec<f64> = sine(100.0, 0.5, 1000.0, 1000)
            .into_iter()
            .map(|x| x + 5.0)
            .collect();
        assert_eq!(dominant_frequency(&signal, 1000.0), 0.0);
    }

    #[test]
    fn test_ties_resolve_to_lowest_bin() {
        let spectrum = Spectrum {
            frequencies: vec![0.0, 1.0, 2.0, 3.0],
            magnitudes: vec![0.1, 0.9, 0.9, 0.2],
            resolution: 1.0,
        };
        assert_eq!(spectrum.dominant_frequency(), 1.0);
    }

    #[test]
    fn test_reference_pattern() {
        let req =
            decode(r#"{"vibration_data":[0,1,0,-1,0,1,0,-1],"sampling_rate":8}"#).unwrap();
        let result = analyze(&req).unwrap();
        assert!((result.rms - 0.5_f64.sqrt()).abs() < 1e-9);
        assert!((result.dominant_frequency - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_frequency_never_exceeds_nyquist() {
        let sampling_rate = 64.0;
        let signal = sine(31.0, 1.0, sampling_rate, 64);
        let freq = dominant_frequency(&signal, sampling_rate);
        assert!(freq <= sampling_rate / 2.0);
    }

    #[test]
    fn test_overflowing_input_is_analysis_error() {
        let req = decode(r#"{"vibration_data":[1e200,-1e200],"sampling_rate":10}"#).unwrap();
        let err = analyze(&req).unwrap_err();
        assert!(matches!(err, PipelineError::Analysis(_)));
    }
}
