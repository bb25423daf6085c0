//! Live capture and playback on the default audio devices.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, select};
use harmonia_core::{Analyzer, Settings, arpeggio, audio};
use log::{error, info, warn};

use crate::display;

/// Blocks buffered between the capture callback and the analysis thread.
const CAPTURE_QUEUE: usize = 64;

/// Interval between displayed analysis frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Plays the arpeggio of `notes`, offset by the keyboard base.
pub fn play(settings: &Settings, notes: &[i32], origin: i32) -> Result<()> {
    let (stream, handle) = audio::start_audio_playback(settings.command_capacity)?;
    handle.set_origin(origin)?;

    let events = arpeggio::schedule(notes, Duration::from_millis(settings.arpeggio_step_ms));
    let start = Instant::now();
    for event in &events {
        if let Some(wait) = event.at.checked_sub(start.elapsed()) {
            thread::sleep(wait);
        }
        let note = event.note + settings.keyboard_base;
        let sent = if event.press {
            handle.press_chord(&[note], settings.chord_gain)
        } else {
            handle.release_chord(&[note])
        };
        if let Err(e) = sent {
            warn!("Skipping note {note}: {e}");
        }
    }

    // Let the last release ring out.
    thread::sleep(Duration::from_millis(500));
    handle.reset()?;
    stream.pause()?;
    Ok(())
}

/// Prints one analysis line per frame interval for `duration`.
pub fn listen(settings: &Settings, duration: Duration) -> Result<()> {
    let (raw_audio_tx, raw_audio_rx) = crossbeam_channel::bounded::<Vec<f32>>(CAPTURE_QUEUE);
    let (stream, sample_rate) = audio::start_audio_capture(raw_audio_tx)?;
    let analyzer = Analyzer::new(settings, sample_rate)?;

    info!("Listening for {:?}", duration);
    println!("{:<26} |{}|", "", display::keyboard(settings.keyboard_keys));

    let worker = thread::spawn(move || analysis_loop(analyzer, raw_audio_rx, duration));
    let result = worker
        .join()
        .map_err(|_| anyhow!("Analysis thread panicked"))?;

    if let Err(e) = stream.pause() {
        error!("Error pausing stream: {}", e);
    }
    drop(stream);
    result
}

fn analysis_loop(
    mut analyzer: Analyzer,
    raw_audio_rx: Receiver<Vec<f32>>,
    duration: Duration,
) -> Result<()> {
    let ticker = crossbeam_channel::tick(FRAME_INTERVAL);
    let deadline = crossbeam_channel::after(duration);
    loop {
        select! {
            recv(raw_audio_rx) -> msg => match msg {
                Ok(block) => analyzer.push(&block),
                Err(_) => {
                    warn!("Audio channel closed");
                    return Ok(());
                }
            },
            recv(ticker) -> _ => {
                let frame = analyzer.analyze()?;
                println!("{}", display::frame(&frame));
            },
            recv(deadline) -> _ => return Ok(()),
        }
    }
}
