// harmonia-core/src/lib.rs

//! The core logic for the harmonia music tool.
//! This crate is responsible for spectrum and pitch analysis, polyphonic
//! synthesis, and chord/scale matching. It is completely headless and
//! contains no GUI code; device glue lives behind the `audio` feature.

pub mod analysis;
pub mod arpeggio;
#[cfg(feature = "audio")]
pub mod audio;
pub mod chord;
pub mod error;
pub mod fft;
pub mod history;
pub mod oscillator;
pub mod pitch;
pub mod settings;
pub mod spectrum;
pub mod tuning;

pub use analysis::{AnalysisFrame, Analyzer};
pub use chord::{CandidateMatch, Candidates};
pub use error::{HarmoniaError, Result};
pub use fft::Spectrum;
pub use oscillator::{Command, OscillatorEngine, OscillatorHandle};
pub use settings::Settings;
