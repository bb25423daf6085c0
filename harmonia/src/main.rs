//! # Harmonia - terminal front end
//!
//! Wires the headless core to the terminal, WAV files and (with the
//! `audio` feature) the default audio devices.
//!
//! ## Architecture
//! - **Main Thread**: argument parsing, chord queries, arpeggio timing
//! - **Analysis Thread**: receives captured blocks and analyzes the history
//! - **Device Threads**: cpal callbacks for capture and oscillator rendering
//! - **Communication**: Crossbeam channels between all of them

mod cli;
mod config;
#[cfg(feature = "audio")]
mod device;
mod display;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use harmonia_core::oscillator::Oscillator;
use harmonia_core::{Settings, arpeggio, chord};
use log::info;

use cli::{Args, Command};

/// Release time rendered after the last arpeggio note.
const RENDER_TAIL: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = config::load(args.config.as_deref())?;

    match args.command {
        Command::Candidates { notes, json } => {
            let found = chord::candidates(&notes);
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                println!("{}", display::candidates(&found, settings.keyboard_base));
            }
        }
        Command::Chord { name } => {
            let notes = parse(&name)?;
            println!("{name}: {notes:?} ({})", display::note_names(&notes, settings.keyboard_base));
        }
        Command::Render { name, out, sample_rate } => {
            render(&settings, &name, &out, sample_rate)?;
        }
        #[cfg(feature = "audio")]
        Command::Play { name, origin } => {
            let notes = parse(&name)?;
            device::play(&settings, &notes, origin)?;
        }
        #[cfg(feature = "audio")]
        Command::Listen { seconds } => {
            device::listen(&settings, Duration::from_secs(seconds))?;
        }
    }
    Ok(())
}

fn parse(name: &str) -> Result<Vec<i32>> {
    Ok(chord::parse_chord_name(name)?)
}

/// Renders a chord's arpeggio offline and writes it as 32-bit float WAV.
fn render(settings: &Settings, name: &str, out: &Path, sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(anyhow!("Sample rate must be positive"));
    }
    let notes = parse(name)?;
    let events = arpeggio::schedule(&notes, Duration::from_millis(settings.arpeggio_step_ms));
    let mut oscillator = Oscillator::new(sample_rate as f32);
    let samples = arpeggio::render(
        &mut oscillator,
        &events,
        settings.keyboard_base,
        settings.chord_gain,
        RENDER_TAIL,
    );

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(out, spec)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    for sample in &samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    info!(
        "Rendered {} ({} samples at {} Hz) to {}",
        name,
        samples.len(),
        sample_rate,
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_chord_is_an_error() {
        let err = parse("Cxyz").unwrap_err();
        assert!(err.to_string().contains("Unknown chord"));
    }

    #[test]
    fn render_writes_wav() {
        let path = std::env::temp_dir().join(format!("harmonia-render-{}.wav", std::process::id()));
        let settings = Settings {
            arpeggio_step_ms: 20,
            ..Settings::default()
        };
        render(&settings, "Am", &path, 8000).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        // four 20 ms steps plus the 500 ms tail
        assert_eq!(reader.len(), 8000 * 580 / 1000);
        fs::remove_file(&path).unwrap();
    }
}
