//! Runtime settings shared by the analysis and playback paths.

use serde::{Deserialize, Serialize};

use crate::error::{HarmoniaError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Input samples kept for analysis.
    pub history_len: usize,
    /// Window handed to the FFT pitch detector. Must be a power of two.
    pub analysis_window: usize,
    /// Oscillator command queue length.
    pub command_capacity: usize,
    /// Total velocity shared by the notes of a pressed chord.
    pub chord_gain: f32,
    /// Note number of the lowest on-screen key.
    pub keyboard_base: i32,
    /// Number of on-screen keys.
    pub keyboard_keys: usize,
    /// Time between arpeggio notes.
    pub arpeggio_step_ms: u64,
    /// Bins of the octave-folded display spectrum.
    pub display_bins: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_len: 48_000,
            analysis_window: 4096,
            command_capacity: 1024,
            chord_gain: 0.5,
            keyboard_base: 72,
            keyboard_keys: 36,
            arpeggio_step_ms: 200,
            display_bins: 36,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !self.analysis_window.is_power_of_two() {
            return Err(HarmoniaError::Settings(format!(
                "analysis_window {} is not a power of two",
                self.analysis_window
            )));
        }
        if self.analysis_window > self.history_len {
            return Err(HarmoniaError::Settings(format!(
                "analysis_window {} exceeds history_len {}",
                self.analysis_window, self.history_len
            )));
        }
        if self.command_capacity == 0 {
            return Err(HarmoniaError::Settings("command_capacity must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.chord_gain) {
            return Err(HarmoniaError::Settings("chord_gain must be within 0.0..=1.0".into()));
        }
        Ok(())
    }
}
