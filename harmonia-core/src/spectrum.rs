//! Coarse per-semitone spectrum for visualization.
//!
//! Each of the 128 MIDI notes gets one single-frequency Fourier coefficient
//! taken over the last 32 wavelengths of the window. Low notes sample
//! sparsely so every note costs about the same. This favors speed over
//! precision and is only meant to drive a display.

use std::f64::consts::PI;

use crate::tuning::{NOTE_COUNT, note_to_hz};

/// Wavelengths of signal used per note.
const CYCLES_PER_NOTE: f64 = 32.0;

/// Samples taken per wavelength at most.
const SAMPLES_PER_CYCLE: f64 = 32.0;

/// Magnitude of the signal at each MIDI note frequency.
///
/// Windows of any length work; the window does not need to be a power
/// of two.
pub fn midi_spectrum(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    let sample_rate = sample_rate as f64;
    (0..NOTE_COUNT)
        .map(|note| {
            let hz = note_to_hz(note as f64);
            let wavelength = sample_rate / hz;
            let need = (CYCLES_PER_NOTE * wavelength).ceil() as usize;
            let stride = ((wavelength / SAMPLES_PER_CYCLE).floor() as usize).max(1);
            let start = samples.len().saturating_sub(need);

            let (mut re, mut im) = (0.0f64, 0.0f64);
            for x in (start..samples.len()).step_by(stride) {
                let theta = -2.0 * PI * hz * x as f64 / sample_rate;
                let sample = samples[x] as f64;
                re += sample * theta.cos();
                im += sample * theta.sin();
            }
            (re * re + im * im).sqrt() as f32
        })
        .collect()
}

/// Folds a spectrum onto `bins` bins by adding bin `j` into `j % bins`.
pub fn fold_spectrum(spectrum: &[f32], bins: usize) -> Vec<f32> {
    if bins == 0 {
        return Vec::new();
    }
    let mut folded = vec![0.0; bins];
    for (index, value) in spectrum.iter().enumerate() {
        folded[index % bins] += value;
    }
    folded
}

/// Scales values so the largest becomes 1.0. All-zero input is unchanged.
pub fn normalize(values: &mut [f32]) {
    let max = values.iter().cloned().fold(0.0f32, f32::max);
    if max > 0.0 && max.is_finite() {
        for value in values.iter_mut() {
            *value /= max;
        }
    }
}
