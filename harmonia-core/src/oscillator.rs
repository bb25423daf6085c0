//! # Polyphonic Oscillator Module
//!
//! Additive sine synthesis over 128 note-indexed voices.
//!
//! The render thread owns an [`OscillatorEngine`]; control threads hold an
//! [`OscillatorHandle`] and send [`Command`]s over a bounded channel. The
//! engine drains every pending command at the start of each block, then
//! renders the block sample by sample. Nothing on the render path blocks
//! or allocates.
//!
//! Loudness follows each voice's target through a one-pole smoother; the
//! summed targets are capped at 1.0 so chords cannot clip.

use std::f64::consts::TAU;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::warn;

use crate::error::{HarmoniaError, Result};
use crate::tuning::{NOTE_COUNT, note_to_hz};

/// Number of voice slots, one per MIDI note.
pub const VOICE_COUNT: usize = NOTE_COUNT;

/// Velocity at or below which a voice is silent.
pub const SILENCE_THRESHOLD: f32 = 1e-4;

/// Fraction of the remaining distance covered per sample at the reference rate.
const DECAY_BASE: f64 = 1e-2;

/// Sample rate the smoothing coefficient is defined for.
const REFERENCE_RATE: f64 = 48_000.0;

/// Velocity of [`OscillatorHandle::press`].
pub const DEFAULT_VELOCITY: f32 = 1.0;

/// Largest transposition, in semitones, in either direction.
pub const MAX_ORIGIN: i32 = 127;

/// Control messages for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Set a voice's target velocity.
    Press { note: u8, velocity: f32 },
    /// Set a voice's target velocity to zero.
    Release { note: u8 },
    /// Release every voice.
    Reset,
    /// Transpose all voices by this many semitones, clamped to
    /// `-MAX_ORIGIN..=MAX_ORIGIN`.
    SetOrigin(i32),
}

/// Lifecycle of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Sounding,
    Releasing,
}

/// One note slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Voice {
    /// Desired loudness (0.0 to 1.0).
    pub target_velocity: f32,
    /// Smoothed current loudness (0.0 to 1.0).
    pub velocity: f32,
    /// Samples rendered since the voice left idle.
    pub phase: u64,
    /// Position within the current sine cycle, in [0, 1).
    cycle: f64,
}

impl Voice {
    fn is_active(&self) -> bool {
        self.velocity > SILENCE_THRESHOLD || self.target_velocity > SILENCE_THRESHOLD
    }

    pub fn state(&self) -> VoiceState {
        if self.target_velocity > SILENCE_THRESHOLD {
            VoiceState::Sounding
        } else if self.velocity > SILENCE_THRESHOLD {
            VoiceState::Releasing
        } else {
            VoiceState::Idle
        }
    }

    fn silence(&mut self) {
        self.phase = 0;
        self.cycle = 0.0;
    }
}

/// Smoothing coefficient for a sample rate.
///
/// `1 - (1 - 0.01) ^ (48000 / sample_rate)`: 0.01 at 48 kHz, and the same
/// envelope time in seconds at any other rate.
pub fn decay_for(sample_rate: f32) -> f32 {
    (1.0 - (1.0 - DECAY_BASE).powf(REFERENCE_RATE / sample_rate as f64)) as f32
}

/// Voice table and synthesis state, without a command channel.
#[derive(Debug, Clone)]
pub struct Oscillator {
    voices: [Voice; VOICE_COUNT],
    /// Per-voice frequency in cycles per sample, including the origin.
    increments: [f64; VOICE_COUNT],
    origin: i32,
    sample_rate: f32,
    decay: f32,
}

impl Oscillator {
    /// Creates an oscillator with every voice idle and no transposition.
    ///
    /// # Arguments
    /// * `sample_rate` - Output sample rate in Hz
    pub fn new(sample_rate: f32) -> Self {
        let mut oscillator = Self {
            voices: [Voice::default(); VOICE_COUNT],
            increments: [0.0; VOICE_COUNT],
            origin: 0,
            sample_rate,
            decay: decay_for(sample_rate),
        };
        oscillator.retune();
        oscillator
    }

    fn retune(&mut self) {
        let sample_rate = self.sample_rate as f64;
        for (note, increment) in self.increments.iter_mut().enumerate() {
            let cycles = note_to_hz((note as i32).saturating_add(self.origin) as f64) / sample_rate;
            *increment = if cycles.is_finite() { cycles } else { 0.0 };
        }
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Per-sample envelope smoothing coefficient, see [`decay_for`].
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Current transposition in semitones.
    pub fn origin(&self) -> i32 {
        self.origin
    }

    /// The voice slot for a note, or `None` above 127.
    pub fn voice(&self, note: u8) -> Option<&Voice> {
        self.voices.get(note as usize)
    }

    /// All 128 voice slots, indexed by note.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Number of voices that are currently sounding or releasing.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Applies a command. Out-of-range notes are ignored.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Press { note, velocity } => {
                if let Some(voice) = self.voices.get_mut(note as usize) {
                    voice.target_velocity = if velocity.is_finite() {
                        velocity.clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                }
            }
            Command::Release { note } => {
                if let Some(voice) = self.voices.get_mut(note as usize) {
                    voice.target_velocity = 0.0;
                }
            }
            Command::Reset => {
                for voice in self.voices.iter_mut() {
                    voice.target_velocity = 0.0;
                }
            }
            Command::SetOrigin(offset) => {
                let offset = offset.clamp(-MAX_ORIGIN, MAX_ORIGIN);
                if offset != self.origin {
                    self.origin = offset;
                    self.retune();
                }
            }
        }
    }

    /// Renders one output sample.
    pub fn next_sample(&mut self) -> f32 {
        let velocity_sum: f32 = self
            .voices
            .iter()
            .filter(|v| v.is_active())
            .map(|v| v.target_velocity)
            .sum();
        let norm = velocity_sum.max(1.0);

        let mut output = 0.0f32;
        for (voice, &increment) in self.voices.iter_mut().zip(&self.increments) {
            if !voice.is_active() {
                continue;
            }
            let target = voice.target_velocity / norm;
            voice.velocity += (target - voice.velocity) * self.decay;
            if voice.velocity <= SILENCE_THRESHOLD {
                voice.silence();
                continue;
            }
            voice.phase += 1;
            voice.cycle = (voice.cycle + increment).fract();
            if !voice.cycle.is_finite() {
                voice.cycle = 0.0;
            }
            output += (TAU * voice.cycle).sin() as f32 * voice.velocity;
        }
        output
    }

    /// Fills a mono buffer.
    pub fn render_mono(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Fills an interleaved buffer, writing each sample to every channel.
    pub fn render_interleaved(&mut self, output: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in output.chunks_mut(channels) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
    }
}

/// The render-thread side: an [`Oscillator`] fed by a command receiver.
pub struct OscillatorEngine {
    oscillator: Oscillator,
    commands: Receiver<Command>,
}

impl OscillatorEngine {
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// Applies every queued command. Returns how many were applied.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_recv() {
            self.oscillator.apply(command);
            applied += 1;
        }
        applied
    }

    /// Drains pending commands, then renders an interleaved block.
    pub fn render(&mut self, output: &mut [f32], channels: usize) {
        self.drain_commands();
        self.oscillator.render_interleaved(output, channels);
    }
}

/// The control side: sends commands without blocking.
#[derive(Debug, Clone)]
pub struct OscillatorHandle {
    sender: Sender<Command>,
}

/// Creates a connected handle/engine pair with a queue of `capacity`
/// commands.
pub fn channel(sample_rate: f32, capacity: usize) -> (OscillatorHandle, OscillatorEngine) {
    let (sender, commands) = crossbeam_channel::bounded(capacity.max(1));
    let handle = OscillatorHandle { sender };
    let engine = OscillatorEngine {
        oscillator: Oscillator::new(sample_rate),
        commands,
    };
    (handle, engine)
}

fn checked_note(note: i32) -> Result<u8> {
    u8::try_from(note)
        .ok()
        .filter(|&n| (n as usize) < VOICE_COUNT)
        .ok_or_else(|| {
            warn!("Ignoring out-of-range note {note}");
            HarmoniaError::NoteOutOfRange(note)
        })
}

impl OscillatorHandle {
    /// Queues a command without blocking.
    ///
    /// # Errors
    /// * `QueueFull` if the engine has not drained the queue; the command
    ///   is dropped
    /// * `ChannelClosed` if the engine is gone
    pub fn send(&self, command: Command) -> Result<()> {
        self.sender.try_send(command).map_err(|err| match err {
            TrySendError::Full(command) => {
                warn!("Oscillator queue full, dropping {command:?}");
                HarmoniaError::QueueFull
            }
            TrySendError::Disconnected(_) => HarmoniaError::ChannelClosed,
        })
    }

    /// Presses a note at [`DEFAULT_VELOCITY`].
    ///
    /// # Errors
    /// * `NoteOutOfRange` for notes outside 0..=127, plus any [`send`](Self::send) error
    pub fn press(&self, note: i32) -> Result<()> {
        self.press_with_velocity(note, DEFAULT_VELOCITY)
    }

    pub fn press_with_velocity(&self, note: i32, velocity: f32) -> Result<()> {
        let note = checked_note(note)?;
        self.send(Command::Press { note, velocity })
    }

    /// Releases a note. Errors as for [`press`](Self::press).
    pub fn release(&self, note: i32) -> Result<()> {
        let note = checked_note(note)?;
        self.send(Command::Release { note })
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    pub fn set_origin(&self, offset: i32) -> Result<()> {
        self.send(Command::SetOrigin(offset))
    }

    /// Presses every note with `gain / notes.len()` each.
    ///
    /// Out-of-range notes are skipped; the first send failure is returned
    /// after the remaining notes have been tried.
    pub fn press_chord(&self, notes: &[i32], gain: f32) -> Result<()> {
        if notes.is_empty() {
            return Ok(());
        }
        let velocity = gain / notes.len() as f32;
        first_error(notes.iter().map(|&note| self.press_with_velocity(note, velocity)))
    }

    pub fn release_chord(&self, notes: &[i32]) -> Result<()> {
        first_error(notes.iter().map(|&note| self.release(note)))
    }
}

fn first_error(results: impl Iterator<Item = Result<()>>) -> Result<()> {
    results.fold(Ok(()), |acc, result| acc.and(result))
}
