//! In-memory audio buffer shared by the model adapter, WAV I/O and the pipeline.

use anyhow::{Result, bail};

/// Audio samples laid out as `channels × frames`, stored frame-interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>, // Interleaved samples, len = frames * channels
    channels: u16,     // Channel count (1 for every Kokoro voice)
    sample_rate: u32,  // Samples per second per channel
}

impl Waveform {
    /// Wrap a single-channel sample buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, channels: 1, sample_rate }
    }

    /// Build a waveform from interleaved samples.
    ///
    /// # Errors
    /// Returns an error if `channels` is zero or the sample count is not a
    /// whole number of frames.
    pub fn from_interleaved(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            bail!("waveform must have at least one channel");
        }
        if samples.len() % channels as usize != 0 {
            bail!("{} samples do not divide into {} channels", samples.len(), channels);
        }
        Ok(Self { samples, channels, sample_rate })
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Average all channels into a single channel.
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.samples.clone();
        }
        let channels = self.channels as usize;
        self.samples.chunks_exact(channels).map(|frame| frame.iter().sum::<f32>() / channels as f32).collect()
    }

    /// Relabel the buffer with another sample rate without touching samples.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Join waveforms end to end along the time axis.
    ///
    /// No padding, fading or normalization is applied: the result holds the
    /// frames of `parts[0]`, then `parts[1]`, and so on.
    ///
    /// # Errors
    /// Returns an error if `parts` is empty or the parts disagree on channel
    /// count or sample rate.
    pub fn concat(parts: &[Waveform]) -> Result<Waveform> {
        let Some(first) = parts.first() else {
            bail!("no waveforms to concatenate");
        };

        let total: usize = parts.iter().map(|p| p.samples.len()).sum();
        let mut samples = Vec::with_capacity(total);

        for (i, part) in parts.iter().enumerate() {
            if part.channels != first.channels {
                bail!("waveform {} has {} channels, expected {}", i + 1, part.channels, first.channels);
            }
            if part.sample_rate != first.sample_rate {
                bail!("waveform {} is {} Hz, expected {} Hz", i + 1, part.sample_rate, first.sample_rate);
            }
            samples.extend_from_slice(&part.samples);
        }

        Ok(Waveform { samples, channels: first.channels, sample_rate: first.sample_rate })
    }
}
