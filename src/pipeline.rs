//! Chunked synthesis pipeline.
//!
//! Text is split into fixed-size chunks, each chunk is synthesized, written to
//! a temporary WAV next to the output and read back, and the reloaded parts
//! are joined into the final file. Chunks are processed strictly in order.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audio::Waveform;
use crate::audio::wav::{read_wav, write_wav};
use crate::tts::{MAX_CHUNK_CHARS, SpeechModel, chunk_text};

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub chunks: usize,
    pub frames: usize,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub output: PathBuf,
}

/// Path of the temporary file for a 1-based chunk index.
///
/// `out/story.wav` with index 3 becomes `out/story_chunk_3.wav`.
pub fn chunk_path(output: &Path, index: usize) -> Result<PathBuf> {
    let Some(stem) = output.file_stem() else {
        bail!("output path {} has no file name", output.display());
    };

    let mut name = OsString::from(stem);
    name.push(format!("_chunk_{index}"));
    if let Some(ext) = output.extension() {
        name.push(".");
        name.push(ext);
    }

    Ok(output.with_file_name(name))
}

/// Temporary chunk files written during a run.
///
/// Files still registered when this is dropped are removed best-effort, so a
/// failed run does not leave partial chunks behind.
struct ChunkFiles<'a> {
    output: &'a Path,
    created: Vec<PathBuf>,
}

impl<'a> ChunkFiles<'a> {
    fn new(output: &'a Path) -> Self {
        Self { output, created: Vec::new() }
    }

    /// Write a chunk's waveform to its temporary file and return the path.
    fn write(&mut self, index: usize, waveform: &Waveform) -> Result<PathBuf> {
        let path = chunk_path(self.output, index)?;
        self.created.push(path.clone());
        write_wav(&path, waveform).with_context(|| format!("failed saving chunk {index}"))?;
        Ok(path)
    }

    /// Delete every temporary file, failing on the first error.
    fn cleanup(&mut self) -> Result<usize> {
        let mut removed = 0;
        while let Some(path) = self.created.last() {
            fs::remove_file(path).with_context(|| format!("failed removing temporary chunk file {}", path.display()))?;
            debug!("Removed {}", path.display());
            self.created.pop();
            removed += 1;
        }
        Ok(removed)
    }
}

impl Drop for ChunkFiles<'_> {
    fn drop(&mut self) {
        for path in self.created.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => warn!("🗑️  Removed partial chunk file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove partial chunk file {}: {}", path.display(), e),
            }
        }
    }
}

/// Synthesize `text` into a single WAV file at `output`.
///
/// # Arguments
/// * `model` - Loaded speech model
/// * `text` - Non-empty input text
/// * `output` - Final WAV path; temporary chunk files are created beside it
/// * `audio_prompt` - Optional voice reference passed to every `generate` call
///
/// # Errors
/// Fails on the first model or I/O error. No final file is written in that case.
pub fn synthesize<M: SpeechModel>(model: &mut M, text: &str, output: &Path, audio_prompt: Option<&Path>) -> Result<RunSummary> {
    let chunks = chunk_text(text, MAX_CHUNK_CHARS);
    let total = chunks.len();
    info!("Total chunks to process: {}", total);

    let mut files = ChunkFiles::new(output);
    let mut parts = Vec::with_capacity(total);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let index = i + 1;
        debug!("Synthesizing chunk {}/{}", index, total);

        let waveform = model.generate(chunk, audio_prompt).with_context(|| format!("speech generation failed for chunk {index}"))?;
        let path = files.write(index, &waveform)?;
        info!("💾 Saved chunk {} to: {}", index, path.display());

        parts.push(read_wav(&path)?);
    }

    let mut combined = Waveform::concat(&parts)?;
    if combined.sample_rate() != model.sample_rate() {
        warn!("Chunk audio is {} Hz but the model reports {} Hz; writing at the model rate", combined.sample_rate(), model.sample_rate());
        combined = combined.with_sample_rate(model.sample_rate());
    }

    write_wav(output, &combined).with_context(|| format!("failed saving final audio to {}", output.display()))?;
    info!("✅ Saved final audio to: {} ({:.2}s)", output.display(), combined.duration_secs());

    let removed = files.cleanup()?;
    info!("🧹 Removed {} temporary chunk files", removed);

    Ok(RunSummary {
        chunks: total,
        frames: combined.frames(),
        sample_rate: combined.sample_rate(),
        duration_secs: combined.duration_secs(),
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use tempfile::TempDir;

    use super::*;

    const RATE: u32 = 24000;

    /// Returns `frames_per_chunk` frames of silence for every chunk and
    /// records what it was asked to synthesize.
    struct SilentModel {
        frames_per_chunk: usize,
        calls: Vec<(String, Option<PathBuf>)>,
        fail_on: Option<usize>,
    }

    impl SilentModel {
        fn new(frames_per_chunk: usize) -> Self {
            Self { frames_per_chunk, calls: Vec::new(), fail_on: None }
        }
    }

    impl SpeechModel for SilentModel {
        fn sample_rate(&self) -> u32 {
            RATE
        }

        fn generate(&mut self, text: &str, audio_prompt: Option<&Path>) -> Result<Waveform> {
            self.calls.push((text.to_string(), audio_prompt.map(Path::to_path_buf)));
            if self.fail_on == Some(self.calls.len()) {
                return Err(anyhow!("model exploded"));
            }
            Ok(Waveform::mono(vec![0.0; self.frames_per_chunk], RATE))
        }
    }

    /// Emits one constant-valued frame block per chunk so order is observable.
    struct NumberedModel {
        calls: usize,
    }

    impl SpeechModel for NumberedModel {
        fn sample_rate(&self) -> u32 {
            RATE
        }

        fn generate(&mut self, _text: &str, _audio_prompt: Option<&Path>) -> Result<Waveform> {
            self.calls += 1;
            Ok(Waveform::mono(vec![self.calls as f32 / 10.0; 3], RATE))
        }
    }

    fn leftover_chunks(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).filter(|p| p.to_string_lossy().contains("_chunk_")).collect()
    }

    #[test]
    fn test_chunk_path_naming() {
        assert_eq!(chunk_path(Path::new("out/story.wav"), 3).unwrap(), PathBuf::from("out/story_chunk_3.wav"));
        assert_eq!(chunk_path(Path::new("story.wav"), 1).unwrap(), PathBuf::from("story_chunk_1.wav"));
        assert_eq!(chunk_path(Path::new("/tmp/a.b.wav"), 12).unwrap(), PathBuf::from("/tmp/a.b_chunk_12.wav"));
        assert_eq!(chunk_path(Path::new("noext"), 2).unwrap(), PathBuf::from("noext_chunk_2"));
        assert!(chunk_path(Path::new("/"), 1).is_err());
    }

    #[test]
    fn test_duration_is_sum_of_chunks() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("book.wav");
        let text = "x".repeat(MAX_CHUNK_CHARS * 2 + 17);
        let mut model = SilentModel::new(4800);

        let summary = synthesize(&mut model, &text, &output, None).unwrap();

        assert_eq!(summary.chunks, 3);
        assert_eq!(model.calls.len(), 3);

        let written = read_wav(&output).unwrap();
        assert_eq!(written.frames(), 3 * 4800);
        assert_eq!(written.sample_rate(), RATE);
        assert!((written.duration_secs() - 3.0 * 0.2).abs() < 1e-9);
        assert_eq!(summary.frames, written.frames());
    }

    #[test]
    fn test_chunks_are_joined_in_text_order() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ordered.wav");
        let text = "y".repeat(MAX_CHUNK_CHARS * 3);
        let mut model = NumberedModel { calls: 0 };

        synthesize(&mut model, &text, &output, None).unwrap();

        let written = read_wav(&output).unwrap();
        assert_eq!(written.samples(), &[0.1, 0.1, 0.1, 0.2, 0.2, 0.2, 0.3, 0.3, 0.3]);
    }

    #[test]
    fn test_model_sees_chunks_and_prompt() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("voice.wav");
        let prompt = dir.path().join("ref.wav");
        let text = format!("{}{}", "a".repeat(MAX_CHUNK_CHARS), "tail");
        let mut model = SilentModel::new(10);

        synthesize(&mut model, &text, &output, Some(&prompt)).unwrap();

        assert_eq!(model.calls.len(), 2);
        assert_eq!(model.calls[0].0, "a".repeat(MAX_CHUNK_CHARS));
        assert_eq!(model.calls[1].0, "tail");
        assert!(model.calls.iter().all(|(_, p)| p.as_deref() == Some(prompt.as_path())));
    }

    #[test]
    fn test_no_temporary_files_after_success() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clean.wav");
        let text = "z".repeat(MAX_CHUNK_CHARS * 4);
        let mut model = SilentModel::new(100);

        synthesize(&mut model, &text, &output, None).unwrap();

        assert!(output.exists());
        assert!(leftover_chunks(dir.path()).is_empty());
    }

    #[test]
    fn test_failure_writes_no_output_and_removes_partial_chunks() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("broken.wav");
        let text = "w".repeat(MAX_CHUNK_CHARS * 3);
        let mut model = SilentModel::new(100);
        model.fail_on = Some(2);

        let err = synthesize(&mut model, &text, &output, None).unwrap_err();

        assert!(format!("{err:#}").contains("chunk 2"));
        assert_eq!(model.calls.len(), 2);
        assert!(!output.exists());
        assert!(leftover_chunks(dir.path()).is_empty());
    }

    #[test]
    fn test_summary_serializes() {
        let summary = RunSummary { chunks: 2, frames: 48000, sample_rate: RATE, duration_secs: 2.0, output: PathBuf::from("out.wav") };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["chunks"], 2);
        assert_eq!(json["sample_rate"], 24000);
        assert_eq!(json["output"], "out.wav");
    }
}
