//! Speech model abstraction.

use std::path::Path;

use anyhow::Result;

use crate::audio::Waveform;

/// A pretrained text-to-speech model.
///
/// Implementations own whatever inference state they need; the pipeline calls
/// [`SpeechModel::generate`] once per chunk, sequentially.
pub trait SpeechModel {
    /// Fixed output sample rate of the model.
    fn sample_rate(&self) -> u32;

    /// Synthesize `text`, optionally conditioned on a reference recording.
    ///
    /// # Errors
    /// Any inference failure. The caller aborts the run on the first error.
    fn generate(&mut self, text: &str, audio_prompt: Option<&Path>) -> Result<Waveform>;
}
