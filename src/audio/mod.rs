//! Audio buffers and WAV file I/O.
//!
//! Waveforms are kept as interleaved `f32` samples and persisted with hound.

pub mod pitch;
mod waveform;
pub mod wav;

pub use waveform::Waveform;
