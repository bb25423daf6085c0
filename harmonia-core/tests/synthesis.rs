//! Oscillator output analysed with the pitch detector.

use harmonia_core::oscillator::{self, Oscillator};
use harmonia_core::{Command, chord, pitch};

fn settled_block(oscillator: &mut Oscillator, len: usize) -> Vec<f32> {
    let mut warmup = vec![0.0; 4800];
    oscillator.render_mono(&mut warmup);
    let mut block = vec![0.0; len];
    oscillator.render_mono(&mut block);
    block
}

#[test]
fn rendered_a4_is_detected() {
    let mut oscillator = Oscillator::new(48000.0);
    oscillator.apply(Command::Press {
        note: 69,
        velocity: 1.0,
    });
    let block = settled_block(&mut oscillator, 4096);
    let hz = pitch::detect_frequency(&block, 48000).unwrap();
    assert!((hz - 440.0).abs() < 4.0, "hz {hz}");
}

#[test]
fn origin_transposes_pitch() {
    let (handle, mut engine) = oscillator::channel(48000.0, 8);
    handle.set_origin(-12).unwrap();
    handle.press(69).unwrap();
    let mut warmup = vec![0.0; 4800];
    engine.render(&mut warmup, 1);
    let mut block = vec![0.0; 4096];
    engine.render(&mut block, 1);
    let hz = pitch::detect_frequency(&block, 48000).unwrap();
    assert!((hz - 220.0).abs() < 2.0, "hz {hz}");
}

#[test]
fn long_sessions_keep_phase_counting() {
    let mut oscillator = Oscillator::new(44100.0);
    oscillator.apply(Command::Press {
        note: 100,
        velocity: 0.5,
    });
    let mut block = vec![0.0; 44100];
    for _ in 0..10 {
        oscillator.render_mono(&mut block);
    }
    assert_eq!(oscillator.voice(100).unwrap().phase, 441_000);
    assert!(block.iter().all(|s| s.is_finite() && s.abs() <= 0.5 + 1e-3));
}

#[test]
fn candidate_chord_plays_through_engine() {
    let found = chord::candidates(&[9, 0, 4]);
    let am = found.chords.iter().find(|c| c.name == "Am").unwrap();
    let (handle, mut engine) = oscillator::channel(48000.0, 16);
    let notes: Vec<i32> = am.notes.iter().map(|n| n + 60).collect();
    handle.press_chord(&notes, 0.5).unwrap();
    let mut block = vec![0.0; 9600];
    engine.render(&mut block, 2);
    assert_eq!(engine.oscillator().active_voices(), 3);
    assert!(block.iter().all(|s| s.abs() <= 0.5 + 1e-3));
}
