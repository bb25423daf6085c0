//! # Musical Tuning Module
//!
//! Equal-temperament conversions between MIDI note numbers, frequencies,
//! note names and cent deviations. A4 (MIDI 69) is 440 Hz.

use once_cell::sync::Lazy;

/// Number of MIDI notes.
pub const NOTE_COUNT: usize = 128;

/// MIDI note number of A4.
pub const A4_NOTE: i32 = 69;

/// Frequency of A4 in Hz.
pub const A4_HZ: f64 = 440.0;

/// Pitch-class names, index 0 is C.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single MIDI note with its name and frequency.
#[derive(Debug, Clone)]
struct Note {
    /// Note name (e.g., "A4", "C#3")
    name: String,
    /// Frequency in Hz
    frequency: f32,
}

/// All 128 MIDI notes, computed once.
static NOTES: Lazy<Vec<Note>> = Lazy::new(|| {
    (0..NOTE_COUNT as i32)
        .map(|note| Note {
            name: note_name(note),
            frequency: note_to_hz(note as f64) as f32,
        })
        .collect()
});

/// Frequency of a (possibly fractional) MIDI note number.
pub fn note_to_hz(note: f64) -> f64 {
    A4_HZ * 2f64.powf((note - A4_NOTE as f64) / 12.0)
}

/// Fractional MIDI note number of a frequency.
pub fn hz_to_note(hz: f64) -> f64 {
    A4_NOTE as f64 + 12.0 * (hz / A4_HZ).log2()
}

/// Name of a MIDI note, with octave -1 starting at note 0 ("C-1").
pub fn note_name(note: i32) -> String {
    let class = note.rem_euclid(12) as usize;
    let octave = note.div_euclid(12) - 1;
    format!("{}{}", PITCH_CLASS_NAMES[class], octave)
}

/// Finds the closest MIDI note to a frequency.
///
/// Returns `(note_number, note_name, target_frequency)`, or `None` for
/// non-positive or non-finite input.
pub fn nearest_note(hz: f32) -> Option<(u8, &'static str, f32)> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    let index = hz_to_note(hz as f64).round().clamp(0.0, (NOTE_COUNT - 1) as f64) as usize;
    let note = &NOTES[index];
    Some((index as u8, note.name.as_str(), note.frequency))
}

/// Deviation from a target frequency in cents.
///
/// Positive values are sharp, negative values flat.
pub fn cents_deviation(hz: f32, target_hz: f32) -> f32 {
    1200.0 * (hz / target_hz).log2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn a4_is_440() {
        assert_relative_eq!(note_to_hz(69.0), 440.0);
        assert_relative_eq!(note_to_hz(81.0), 880.0, epsilon = 1e-9);
        assert_relative_eq!(hz_to_note(220.0), 57.0, epsilon = 1e-9);
    }

    #[test]
    fn names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
        assert_eq!(nearest_note(12543.85).unwrap().1, "G9");
    }

    #[test]
    fn nearest() {
        let (number, name, target) = nearest_note(445.0).unwrap();
        assert_eq!(number, 69);
        assert_eq!(name, "A4");
        assert_relative_eq!(target, 440.0);
        assert!(cents_deviation(445.0, target) > 0.0);
        assert!(nearest_note(0.0).is_none());
        assert!(nearest_note(f32::NAN).is_none());
    }
}
