//! # Chord and Scale Module
//!
//! Matches a set of pressed notes against fixed scale and chord templates
//! in all twelve transpositions, and parses chord names such as `"Am"`,
//! `"F#7"` or the rotated `"1C"` back into notes.
//!
//! Notes are plain `i32` semitone numbers. Pitch classes are notes reduced
//! modulo 12; template offsets may exceed 11 for extended chords.

use serde::{Deserialize, Serialize};

use crate::error::{HarmoniaError, Result};
use crate::tuning::PITCH_CLASS_NAMES;

const OCTAVE: i32 = 12;

/// A named scale shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTemplate {
    pub name: &'static str,
    pub offsets: &'static [i32],
}

/// Chord quality groups, in the order candidates are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChordKind {
    Major,
    Minor,
    Diminished,
    Sus4,
    Augmented,
    Seventh,
    Ninth,
}

/// A named chord shape. The suffix follows the root in chord names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTemplate {
    pub kind: ChordKind,
    pub suffix: &'static str,
    pub offsets: &'static [i32],
}

pub const SCALES: [ScaleTemplate; 2] = [
    ScaleTemplate {
        name: "major",
        offsets: &[0, 2, 4, 5, 7, 9, 11],
    },
    ScaleTemplate {
        name: "minor",
        offsets: &[0, 2, 3, 5, 7, 8, 10],
    },
];

pub const CHORDS: [ChordTemplate; 16] = [
    ChordTemplate {
        kind: ChordKind::Major,
        suffix: "",
        offsets: &[0, 4, 7],
    },
    ChordTemplate {
        kind: ChordKind::Minor,
        suffix: "m",
        offsets: &[0, 3, 7],
    },
    ChordTemplate {
        kind: ChordKind::Diminished,
        suffix: "dim",
        offsets: &[0, 3, 6],
    },
    ChordTemplate {
        kind: ChordKind::Sus4,
        suffix: "sus4",
        offsets: &[0, 5, 7],
    },
    ChordTemplate {
        kind: ChordKind::Augmented,
        suffix: "aug",
        offsets: &[0, 4, 8],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "7",
        offsets: &[0, 4, 7, 10],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "M7",
        offsets: &[0, 4, 7, 11],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "m7",
        offsets: &[0, 3, 7, 10],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "mM7",
        offsets: &[0, 3, 7, 11],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "m7b5",
        offsets: &[0, 3, 6, 10],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "dim7",
        offsets: &[0, 3, 6, 9],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "7sus4",
        offsets: &[0, 5, 7, 10],
    },
    ChordTemplate {
        kind: ChordKind::Seventh,
        suffix: "aug7",
        offsets: &[0, 4, 8, 10],
    },
    ChordTemplate {
        kind: ChordKind::Ninth,
        suffix: "9",
        offsets: &[0, 4, 7, 10, 14],
    },
    ChordTemplate {
        kind: ChordKind::Ninth,
        suffix: "M9",
        offsets: &[0, 4, 7, 11, 14],
    },
    ChordTemplate {
        kind: ChordKind::Ninth,
        suffix: "m9",
        offsets: &[0, 3, 7, 10, 14],
    },
];

/// A display name with the notes it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub name: String,
    pub notes: Vec<i32>,
}

/// Scales and chords consistent with a set of pressed notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidates {
    pub scales: Vec<CandidateMatch>,
    pub chords: Vec<CandidateMatch>,
}

impl Candidates {
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty() && self.chords.is_empty()
    }
}

fn pitch_class(note: i32) -> i32 {
    note.rem_euclid(OCTAVE)
}

/// True when every pressed pitch class occurs in `offsets` transposed by `root`.
fn matches(pressed: &[i32], offsets: &[i32], root: i32) -> bool {
    pressed.iter().all(|&note| {
        offsets
            .iter()
            .any(|&offset| pitch_class(note) == pitch_class(offset + root))
    })
}

/// Name of a chord: root pitch-class name followed by the suffix.
pub fn name_for(root: i32, suffix: &str) -> String {
    format!("{}{}", PITCH_CLASS_NAMES[pitch_class(root) as usize], suffix)
}

/// Redistributes notes across octaves, choosing which note ends up on top.
///
/// After sorting, note `i` of `len` moves by
/// `step * floor(((len - 1 - i) + shift) / len)`, where `step` is one octave
/// or, for shapes wider than an octave, enough whole octaves to clear them.
/// `shift = 1` lifts the lowest note above the rest, `shift = -1` drops the
/// highest below the rest. The result is sorted ascending.
pub fn rotate(notes: &[i32], shift: i32) -> Vec<i32> {
    let mut sorted = notes.to_vec();
    sorted.sort_unstable();
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return sorted;
    };
    let range = max as i64 - min as i64;
    let step = range.signum() * (1 + range.abs() / OCTAVE as i64) * OCTAVE as i64;
    let len = sorted.len() as i64;
    // Whole turns of the chord plus the remainder, so large shifts cannot overflow.
    let turns = (shift as i64).div_euclid(len);
    let rest = (shift as i64).rem_euclid(len);

    let mut rotated: Vec<i32> = sorted
        .iter()
        .enumerate()
        .map(|(i, &note)| {
            let octaves = turns + (len - 1 - i as i64 + rest) / len;
            let moved = (note as i64).saturating_add(step.saturating_mul(octaves));
            moved.clamp(i32::MIN as i64, i32::MAX as i64) as i32
        })
        .collect();
    rotated.sort_unstable();
    rotated
}

/// Voices a chord so its top note has the pitch class of the highest
/// pressed note, then drops it by whole octaves until the lowest note is
/// in `0..12`.
fn voice_to_top(notes: &[i32], top_class: i32) -> Vec<i32> {
    let mut sorted = notes.to_vec();
    sorted.sort_unstable();
    let len = sorted.len() as i32;
    let top_index = sorted
        .iter()
        .position(|&note| pitch_class(note) == top_class)
        .map_or(len - 1, |i| i as i32);

    let mut voiced = rotate(&sorted, (top_index + 1) % len);
    if let Some(&lowest) = voiced.first() {
        let drop = lowest.div_euclid(OCTAVE) * OCTAVE;
        for note in voiced.iter_mut() {
            *note -= drop;
        }
    }
    voiced
}

/// Finds every scale and chord, in every key, containing all pressed notes.
///
/// Scales are listed in table order by root. Chords are listed by quality
/// (triads first, then sevenths, then ninths) and then by root, each voiced
/// so its top note matches the highest pressed note's pitch class.
pub fn match_scale_or_chord(pressed: &[i32]) -> Candidates {
    let Some(&highest) = pressed.iter().max() else {
        return Candidates::default();
    };
    let top_class = pitch_class(highest);

    let mut scales = Vec::new();
    for scale in SCALES.iter() {
        for root in 0..OCTAVE {
            if matches(pressed, scale.offsets, root) {
                scales.push(CandidateMatch {
                    name: format!("{} {}", PITCH_CLASS_NAMES[root as usize], scale.name),
                    notes: scale.offsets.iter().map(|offset| offset + root).collect(),
                });
            }
        }
    }

    let mut chords: Vec<(ChordKind, usize, i32, CandidateMatch)> = Vec::new();
    for (order, chord) in CHORDS.iter().enumerate() {
        for root in 0..OCTAVE {
            if matches(pressed, chord.offsets, root) {
                let notes: Vec<i32> = chord.offsets.iter().map(|offset| offset + root).collect();
                chords.push((
                    chord.kind,
                    order,
                    root,
                    CandidateMatch {
                        name: name_for(root, chord.suffix),
                        notes: voice_to_top(&notes, top_class),
                    },
                ));
            }
        }
    }
    chords.sort_by_key(|(kind, order, root, _)| (*kind, *order, *root));

    Candidates {
        scales,
        chords: chords.into_iter().map(|(_, _, _, candidate)| candidate).collect(),
    }
}

/// Query-boundary alias for [`match_scale_or_chord`].
pub fn candidates(pitch_classes: &[i32]) -> Candidates {
    match_scale_or_chord(pitch_classes)
}

fn root_for_letter(letter: char) -> Option<i32> {
    PITCH_CLASS_NAMES
        .iter()
        .position(|name| name.len() == 1 && name.starts_with(letter))
        .map(|index| index as i32)
}

/// Parses `[rotation][A-G][#|b][suffix]` into notes.
///
/// The optional rotation is a signed integer applied with [`rotate`], at
/// most twice the chord's note count in either direction.
///
/// # Errors
/// * `UnknownChord` if the root letter is missing, the suffix is not in
///   the chord table, or the rotation is out of range
pub fn parse_chord_name(text: &str) -> Result<Vec<i32>> {
    let unknown = || HarmoniaError::UnknownChord(text.to_string());
    let trimmed = text.trim();

    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    let (rotation, rest) = trimmed.split_at(digits_end);
    let rotation = match rotation {
        "" => 0,
        r => r.parse::<i32>().map_err(|_| unknown())?,
    };

    let mut chars = rest.chars();
    let root = chars.next().and_then(root_for_letter).ok_or_else(unknown)?;
    let rest = chars.as_str();
    let (accidental, suffix) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let chord = CHORDS
        .iter()
        .find(|chord| chord.suffix == suffix)
        .ok_or_else(unknown)?;
    let notes: Vec<i32> = chord
        .offsets
        .iter()
        .map(|offset| offset + root + accidental)
        .collect();
    let max_rotation = 2 * notes.len() as i64;
    if (rotation as i64).abs() > max_rotation {
        return Err(unknown());
    }
    Ok(rotate(&notes, rotation))
}

/// Notes of a chord name, or an empty list when it cannot be parsed.
pub fn from_name(text: &str) -> Vec<i32> {
    parse_chord_name(text).unwrap_or_default()
}
