//! Auditioning a note set as an arpeggio.
//!
//! Each note is pressed in order, one step apart, and the first note is
//! repeated an octave up at the end. Every press is released one step
//! after it started.

use std::time::Duration;

use crate::oscillator::{Command, Oscillator};

/// A press or release at an offset from the start of the arpeggio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub at: Duration,
    pub note: i32,
    pub press: bool,
}

/// Builds the press/release timeline for `notes`, ordered by time.
///
/// Where a release and the next press fall on the same instant the
/// release comes first.
pub fn schedule(notes: &[i32], step: Duration) -> Vec<ScheduledEvent> {
    let len = notes.len();
    let mut events = Vec::with_capacity(2 * (len + 1));
    for (i, &note) in notes.iter().enumerate() {
        events.push(step_events(note, i, step));
    }
    if let Some(&first) = notes.first() {
        events.push(step_events(first + 12, len, step));
    }
    let mut events: Vec<ScheduledEvent> = events.into_iter().flatten().collect();
    events.sort_by_key(|event| (event.at, event.press));
    events
}

fn step_events(note: i32, index: usize, step: Duration) -> [ScheduledEvent; 2] {
    [
        ScheduledEvent {
            at: step * index as u32,
            note,
            press: true,
        },
        ScheduledEvent {
            at: step * (index as u32 + 1),
            note,
            press: false,
        },
    ]
}

/// Total length of an arpeggio.
pub fn duration(events: &[ScheduledEvent]) -> Duration {
    events.last().map_or(Duration::ZERO, |event| event.at)
}

/// Renders a schedule offline through `oscillator`, followed by `tail` of
/// release time. Notes are offset by `base` and each is pressed as a
/// one-note chord, so it gets the whole of `gain`. Notes outside the voice
/// range are skipped.
pub fn render(
    oscillator: &mut Oscillator,
    events: &[ScheduledEvent],
    base: i32,
    gain: f32,
    tail: Duration,
) -> Vec<f32> {
    let sample_rate = oscillator.sample_rate() as f64;
    let to_samples = |at: Duration| (at.as_secs_f64() * sample_rate).round() as usize;
    let total = to_samples(duration(events) + tail);
    let mut output = vec![0.0; total];

    let mut cursor = 0;
    for event in events {
        let at = to_samples(event.at).min(total);
        oscillator.render_mono(&mut output[cursor..at]);
        cursor = at;
        let Ok(note) = u8::try_from(event.note + base) else {
            continue;
        };
        oscillator.apply(if event.press {
            Command::Press {
                note,
                velocity: gain,
            }
        } else {
            Command::Release { note }
        });
    }
    oscillator.render_mono(&mut output[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(200);

    #[test]
    fn triad_timeline() {
        let events = schedule(&[0, 4, 7], STEP);
        assert_eq!(events.len(), 8);
        let presses: Vec<(u64, i32)> = events
            .iter()
            .filter(|e| e.press)
            .map(|e| (e.at.as_millis() as u64, e.note))
            .collect();
        assert_eq!(presses, vec![(0, 0), (200, 4), (400, 7), (600, 12)]);
        assert_eq!(duration(&events), Duration::from_millis(800));
    }

    #[test]
    fn release_precedes_next_press() {
        let events = schedule(&[0, 4], STEP);
        assert_eq!(
            events[1],
            ScheduledEvent {
                at: STEP,
                note: 0,
                press: false,
            }
        );
        assert_eq!(
            events[2],
            ScheduledEvent {
                at: STEP,
                note: 4,
                press: true,
            }
        );
    }

    #[test]
    fn empty_schedule() {
        assert!(schedule(&[], STEP).is_empty());
        assert_eq!(duration(&[]), Duration::ZERO);
    }

    #[test]
    fn offline_render_sounds_and_ends_silent() {
        let mut oscillator = Oscillator::new(48000.0);
        let events = schedule(&[0, 4, 7], Duration::from_millis(50));
        let audio = render(&mut oscillator, &events, 60, 0.5, Duration::from_millis(500));
        assert_eq!(audio.len(), 48000 * 700 / 1000);
        assert!(audio[..2400].iter().any(|s| s.abs() > 0.1));
        assert!(audio.iter().all(|s| s.abs() <= 1.0));
        assert_eq!(oscillator.active_voices(), 0);
    }

    #[test]
    fn render_presses_at_gain() {
        let mut oscillator = Oscillator::new(48000.0);
        let events = schedule(&[0], STEP);
        // Stop before the first release.
        render(&mut oscillator, &events[..1], 60, 0.5, Duration::ZERO);
        assert_eq!(oscillator.voice(60).unwrap().target_velocity, 0.5);
    }
}
