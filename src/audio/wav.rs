//! WAV file reading and writing via hound.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::Waveform;

/// Write a waveform as a 32-bit float WAV file.
///
/// Float samples are stored as-is, so reading the file back yields the
/// exact same sample values.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<()> {
    let spec = WavSpec {
        channels: waveform.channels(),
        sample_rate: waveform.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).with_context(|| format!("failed creating wav file {}", path.display()))?;

    for &sample in waveform.samples() {
        writer.write_sample(sample)?;
    }

    writer.finalize().with_context(|| format!("failed finalizing wav file {}", path.display()))?;
    Ok(())
}

/// Read a WAV file into a waveform.
///
/// Accepts float and integer PCM. Integer samples are scaled into [-1.0, 1.0].
///
/// # Errors
/// Returns an error if the file is missing, malformed or uses an unsupported
/// sample layout.
pub fn read_wav(path: &Path) -> Result<Waveform> {
    let mut reader = WavReader::open(path).with_context(|| format!("failed opening wav file {}", path.display()))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>(),
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader.samples::<i32>().map(|s| s.map(|v| v as f32 * scale)).collect::<Result<Vec<_>, _>>()
        }
    }
    .with_context(|| format!("failed decoding samples from {}", path.display()))?;

    Waveform::from_interleaved(samples, spec.channels, spec.sample_rate)
}
