use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pitch analysis, polyphonic tones and chord suggestions.
#[derive(Parser, Debug)]
#[command(name = "harmonia", version, about)]
pub struct Args {
    /// JSON settings file. Missing fields take their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List scales and chords containing the given notes
    Candidates {
        /// Notes relative to the lowest key (pitch classes 0-11 or wider)
        #[arg(required = true, allow_negative_numbers = true)]
        notes: Vec<i32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resolve a chord name such as "Am", "F#7" or "1C" to notes
    Chord {
        #[arg(allow_hyphen_values = true)]
        name: String,
    },
    /// Render a chord's arpeggio to a WAV file
    Render {
        #[arg(allow_hyphen_values = true)]
        name: String,
        /// Output file
        #[arg(long, short, default_value = "arpeggio.wav")]
        out: PathBuf,
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
    },
    /// Play a chord's arpeggio on the default output device
    #[cfg(feature = "audio")]
    Play {
        #[arg(allow_hyphen_values = true)]
        name: String,
        /// Transposition in semitones
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        origin: i32,
    },
    /// Show the detected pitch and spectrum of the default input device
    #[cfg(feature = "audio")]
    Listen {
        /// Stop after this many seconds
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}
