//! Per-frame analysis of the input history.

use log::debug;

use crate::error::{HarmoniaError, Result};
use crate::history::SampleHistory;
use crate::settings::Settings;
use crate::{pitch, spectrum, tuning};

/// Represents the result of a single audio analysis frame.
#[derive(Debug, Clone, Default)]
pub struct AnalysisFrame {
    /// Magnitude at each of the 128 MIDI notes.
    pub midi_spectrum: Vec<f32>,
    /// Octave-folded and normalized spectrum for bar display.
    pub display: Vec<f32>,
    /// Estimated fundamental period in samples.
    pub period: Option<f32>,
    /// The detected fundamental in Hz.
    pub frequency: Option<f32>,
    /// The nearest note's MIDI number.
    pub note: Option<u8>,
    /// The name of the nearest note.
    pub note_name: Option<String>,
    /// The deviation from the nearest note in cents.
    pub cents_deviation: Option<f32>,
}

/// Owns the input history and turns it into [`AnalysisFrame`]s.
#[derive(Debug, Clone)]
pub struct Analyzer {
    history: SampleHistory,
    sample_rate: u32,
    window: usize,
    display_bins: usize,
}

impl Analyzer {
    pub fn new(settings: &Settings, sample_rate: u32) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            history: SampleHistory::new(settings.history_len),
            sample_rate,
            window: settings.analysis_window,
            display_bins: settings.display_bins,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Adds a block of captured mono samples.
    pub fn push(&mut self, block: &[f32]) {
        self.history.push(block);
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    /// Analyzes the current history.
    pub fn analyze(&self) -> Result<AnalysisFrame> {
        let samples = self.history.snapshot();
        let midi_spectrum = spectrum::midi_spectrum(&samples, self.sample_rate);
        let mut display = spectrum::fold_spectrum(&midi_spectrum, self.display_bins);
        spectrum::normalize(&mut display);

        let window = self.history.latest(self.window);
        let period = match pitch::detect_period(&window) {
            Ok(period) => Some(period),
            Err(HarmoniaError::NoPeakFound) => None,
            Err(err) => return Err(err),
        };
        let frequency = period.map(|p| self.sample_rate as f32 / p);
        let nearest = frequency.and_then(tuning::nearest_note);

        let frame = AnalysisFrame {
            midi_spectrum,
            display,
            period,
            frequency,
            note: nearest.map(|(note, _, _)| note),
            note_name: nearest.map(|(_, name, _)| name.to_string()),
            cents_deviation: nearest
                .zip(frequency)
                .map(|((_, _, target), hz)| tuning::cents_deviation(hz, target)),
        };
        debug!(
            "Analysis frame: {:?} Hz, note {:?}",
            frame.frequency, frame.note_name
        );
        Ok(frame)
    }
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
    fn silence_has_no_pitch() {
        let analyzer = Analyzer::new(&Settings::default(), 48000).unwrap();
        let frame = analyzer.analyze().unwrap();
        assert_eq!(frame.midi_spectrum.len(), 128);
        assert_eq!(frame.display.len(), 36);
        assert!(frame.period.is_none());
        assert!(frame.note_name.is_none());
    }

    #[test]
    fn detects_a4() {
        let mut analyzer = Analyzer::new(&Settings::default(), 48000).unwrap();
        analyzer.push(&sine(440.0, 48000, 48000));
        let frame = analyzer.analyze().unwrap();
        assert_eq!(frame.note, Some(69));
        assert_eq!(frame.note_name.as_deref(), Some("A4"));
        assert!(frame.cents_deviation.unwrap().abs() < 50.0);
        // 69 % 36 == 33
        assert_eq!(frame.display[33], 1.0);
    }

    #[test]
    fn pitch_follows_latest_window() {
        let mut analyzer = Analyzer::new(&Settings::default(), 48000).unwrap();
        analyzer.push(&sine(440.0, 48000, 48000 - 4096));
        analyzer.push(&sine(220.0, 48000, 4096));
        let frame = analyzer.analyze().unwrap();
        assert_eq!(frame.note_name.as_deref(), Some("A3"));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = Settings {
            analysis_window: 1000,
            ..Settings::default()
        };
        assert!(Analyzer::new(&settings, 48000).is_err());
    }
}
