//! # Pitch Detection Module
//!
//! Autocorrelation pitch detection. The autocorrelation is the inverse
//! transform of the power spectrum (Wiener-Khinchin), so it reuses the
//! radix-2 FFT instead of an O(n²) lag sweep.

use crate::error::{HarmoniaError, Result};
use crate::fft::{self, Spectrum};

/// Circular autocorrelation of the signal behind `spectrum`.
///
/// # Errors
/// * `InvalidInput` if the spectrum is not a power of two long
pub fn autocorrelation(spectrum: &Spectrum) -> Result<Vec<f32>> {
    fft::ifft(&Spectrum::from_real(spectrum.power()))
}

/// Estimates the fundamental period, in samples, of the signal whose
/// forward transform is `spectrum`.
///
/// The highest interior local maximum of the autocorrelation is taken as
/// the period and refined from its two neighbours. A real signal's
/// circular autocorrelation is symmetric (`r[k] == r[len - k]`), so only
/// lags up to `len / 2` are searched; the mirrored half would report the
/// complement `len - period` with the same height.
///
/// # Errors
/// * `InvalidInput` if the spectrum is not a power of two long
/// * `NoPeakFound` if no interior local maximum exists (silence, constant
///   or monotonic input)
pub fn estimate_period(spectrum: &Spectrum) -> Result<f32> {
    let correlation = autocorrelation(spectrum)?;
    let len = correlation.len();
    if len < 3 {
        return Err(HarmoniaError::NoPeakFound);
    }

    let last = (len / 2).min(len - 2);
    let mut peak: Option<usize> = None;
    for i in 1..=last {
        let is_peak = correlation[i] > correlation[i - 1] && correlation[i] > correlation[i + 1];
        if is_peak && peak.is_none_or(|p| correlation[i] > correlation[p]) {
            peak = Some(i);
        }
    }
    let peak = peak.ok_or(HarmoniaError::NoPeakFound)?;

    let (p0, p1, p2) = (
        correlation[peak - 1],
        correlation[peak],
        correlation[peak + 1],
    );
    let shift = if p0 > p2 { -p0 / (p0 + p1) } else { p2 / (p1 + p2) };
    let period = if shift.is_finite() && shift.abs() < 1.0 {
        peak as f32 + shift
    } else {
        peak as f32
    };

    if period.is_finite() && period > 0.0 {
        Ok(period)
    } else {
        Err(HarmoniaError::NoPeakFound)
    }
}

/// Estimates the period of a power-of-two-length sample window.
pub fn detect_period(samples: &[f32]) -> Result<f32> {
    estimate_period(&fft::fft(samples)?)
}

/// Estimates the fundamental frequency in Hz of a power-of-two-length
/// sample window.
pub fn detect_frequency(samples: &[f32], sample_rate: u32) -> Result<f32> {
    detect_period(samples).map(|period| sample_rate as f32 / period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(hz: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn sine_100hz_period() {
        let period = detect_period(&sine(100.0, 48000, 4096)).unwrap();
        assert!((period - 480.0).abs() < 3.0, "period {period}");
    }

    #[test]
    fn frequency_of_a3() {
        let hz = detect_frequency(&sine(220.0, 44100, 8192), 44100).unwrap();
        assert!((hz - 220.0).abs() < 2.0, "hz {hz}");
    }

    #[test]
    fn harmonics_do_not_shift_fundamental() {
        let signal: Vec<f32> = sine(150.0, 48000, 4096)
            .iter()
            .zip(sine(300.0, 48000, 4096))
            .zip(sine(450.0, 48000, 4096))
            .map(|((a, b), c)| a + 0.5 * b + 0.25 * c)
            .collect();
        let period = detect_period(&signal).unwrap();
        assert!((period - 320.0).abs() < 3.0, "period {period}");
    }

    #[test]
    fn degenerate_input_has_no_peak() {
        assert_eq!(detect_period(&[0.0; 1024]), Err(HarmoniaError::NoPeakFound));
        assert_eq!(detect_period(&[0.5; 1024]), Err(HarmoniaError::NoPeakFound));
        assert_eq!(detect_period(&[1.0, 2.0]), Err(HarmoniaError::NoPeakFound));
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert_eq!(
            detect_period(&[0.0; 1000]),
            Err(HarmoniaError::InvalidInput { len: 1000 })
        );
    }
}
