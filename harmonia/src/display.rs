//! Text rendering for the terminal front end.

use harmonia_core::tuning::note_name;
use harmonia_core::{AnalysisFrame, CandidateMatch, Candidates};

/// Bar glyphs from empty to full.
const BARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Black keys within an octave, starting at C.
const BLACK_KEYS: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

/// Space-separated note names, offset by `base`.
pub fn note_names(notes: &[i32], base: i32) -> String {
    notes
        .iter()
        .map(|&note| note_name(note + base))
        .collect::<Vec<_>>()
        .join(" ")
}

fn candidate_line(candidate: &CandidateMatch, base: i32) -> String {
    format!("  {:<10} {}", candidate.name, note_names(&candidate.notes, base))
}

pub fn candidates(found: &Candidates, base: i32) -> String {
    let mut lines = vec![format!("Scales ({})", found.scales.len())];
    lines.extend(found.scales.iter().map(|c| candidate_line(c, base)));
    lines.push(format!("Chords ({})", found.chords.len()));
    lines.extend(found.chords.iter().map(|c| candidate_line(c, base)));
    lines.join("\n")
}

/// One bar per display bin, values expected in 0.0..=1.0.
pub fn bars(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| {
            let level = (v.clamp(0.0, 1.0) * (BARS.len() - 1) as f32).round() as usize;
            BARS[level]
        })
        .collect()
}

/// Keyboard legend aligned with [`bars`]: `#` for black keys, `-` for white.
pub fn keyboard(keys: usize) -> String {
    (0..keys)
        .map(|key| if BLACK_KEYS[key % 12] { '#' } else { '-' })
        .collect()
}

pub fn frame(frame: &AnalysisFrame) -> String {
    let pitch = match (&frame.note_name, frame.frequency, frame.cents_deviation) {
        (Some(name), Some(hz), Some(cents)) => format!("{name:<4} {hz:8.2} Hz {cents:+6.1} c"),
        _ => format!("{:<4} {:>8} Hz {:>6}  ", "--", "--", "--"),
    };
    format!("{pitch} |{}|", bars(&frame.display))
}
