//! # Audio Device Module
//!
//! Real-time audio capture and playback using CPAL (Cross-Platform Audio
//! Library).
//!
//! ## Features
//! - Default input device capture, downmixed to mono
//! - Default output device playback driven by the oscillator engine
//! - Non-blocking hand-off between device callbacks and the rest of the app

use anyhow::{Context, Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SupportedStreamConfigRange};
use crossbeam_channel::Sender;
use log::{error, info};

use crate::oscillator::{self, OscillatorHandle};

/// Preferred capture sample rate.
const TARGET_SAMPLE_RATE: u32 = 48_000;

/// Starts audio capture from the default input device.
///
/// Every callback block is averaged to mono and sent with `try_send`; when
/// the analysis side falls behind, blocks are dropped rather than stalling
/// the device thread.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = TARGET_SAMPLE_RATE
        .clamp(supported_config.min_sample_rate().0, supported_config.max_sample_rate().0);
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();
    let channels = config.channels as usize;

    info!("Selected input: {} Hz, {} channel(s)", sample_rate, channels);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mono: Vec<f32> = data
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect();
            let _ = sender.try_send(mono);
        },
        |err| error!("An error occurred on the input stream: {}", err),
        None,
    )?;

    stream.play().context("Failed to start input stream")?;

    Ok((stream, sample_rate))
}

/// Starts playback on the default output device.
///
/// The oscillator engine is moved into the output callback; the returned
/// handle sends it commands.
pub fn start_audio_playback(command_capacity: usize) -> Result<(cpal::Stream, OscillatorHandle)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;

    info!("Using audio output device: {}", device.name()?);

    let supported_config = device.default_output_config()?;
    if supported_config.sample_format() != SampleFormat::F32 {
        return Err(anyhow!(
            "Unsupported output sample format: {:?}",
            supported_config.sample_format()
        ));
    }
    let config: cpal::StreamConfig = supported_config.into();
    let sample_rate = config.sample_rate.0;
    let channels = config.channels as usize;

    info!("Selected output: {} Hz, {} channel(s)", sample_rate, channels);

    let (handle, mut engine) = oscillator::channel(sample_rate as f32, command_capacity);

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            engine.render(data, channels);
        },
        |err| error!("An error occurred on the output stream: {}", err),
        None,
    )?;

    stream.play().context("Failed to start output stream")?;

    Ok((stream, handle))
}

/// Picks the f32 input configuration whose rate range is closest to
/// `target_rate`, preferring mono.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            let inside =
                c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0;
            let rate_diff = if inside { 0 } else { min_diff.min(max_diff) };
            (rate_diff, c.channels())
        })
}
