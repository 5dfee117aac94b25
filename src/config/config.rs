//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::device::{self, Device};

/// Directory that input text file names are resolved against.
pub const DEFAULT_INPUT_DIR: &str = "/kaggle/input/";

/// Name of the Kokoro model bundle inside the model directory.
const KOKORO_BUNDLE: &str = "kokoro-multi-lang-v1_0";

/// Batch text-to-speech configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "chunked-tts")]
#[command(author, version, about = "Synthesize a text file into a single WAV file", long_about = None)]
pub struct AppConfig {
    /// Input text file name, resolved under --input-dir
    pub input: String,

    /// Output audio path (WAV)
    pub output: PathBuf,

    /// Reference audio used to condition the voice
    pub audio_prompt: Option<PathBuf>,

    /// Base directory for the input text file
    #[arg(long, env = "TTS_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Directory containing the Kokoro model bundle
    #[arg(long, short = 'd', env = "MODEL_DIR", default_value_os_t = default_model_dir())]
    pub model_dir: PathBuf,

    /// Kokoro speaker ID (af_bella=2, af_heart=3, bf_emma=21)
    #[arg(long, default_value = "2")]
    pub speaker_id: i32,

    /// Speech speed multiplier
    #[arg(long, default_value = "1.0")]
    pub speed: f32,

    /// Inference device (probed if not specified)
    #[arg(long, env = "TTS_DEVICE", value_enum)]
    pub device: Option<Device>,

    /// Inference threads (0 = auto-detect based on CPU cores)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    ///
    /// Usage errors, including a wrong number of positional arguments, print
    /// the clap message and usage line to stdout and exit with status 1.
    /// `--help` and `--version` exit 0.
    pub fn from_args() -> Self {
        match Self::try_parse() {
            Ok(config) => config,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => {
                print!("{}", usage_message(&e));
                std::process::exit(1);
            }
        }
    }

    /// Resolve the inference device, probing the host unless one was given.
    pub fn effective_device(&self) -> Device {
        self.device.unwrap_or_else(device::detect_device)
    }

    /// Inference thread count for the given device.
    ///
    /// With CUDA the GPU handles parallelism, so a single host thread is used.
    /// On CPU half the cores are used, leaving headroom for WAV I/O.
    pub fn effective_threads(&self, device: Device) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        match device {
            Device::Cuda => 1,
            Device::Cpu | Device::Mps => (num_cpus::get() / 2).max(1),
        }
    }

    fn kokoro_dir(&self) -> PathBuf {
        self.model_dir.join("tts").join(KOKORO_BUNDLE)
    }

    /// Get the path to the Kokoro TTS model.
    pub fn tts_model_path(&self) -> PathBuf {
        self.kokoro_dir().join("model.onnx")
    }

    /// Get the path to the Kokoro TTS voices.bin file.
    pub fn tts_voices_path(&self) -> PathBuf {
        self.kokoro_dir().join("voices.bin")
    }

    /// Get the path to the TTS tokens file.
    pub fn tts_tokens_path(&self) -> PathBuf {
        self.kokoro_dir().join("tokens.txt")
    }

    /// Get the path to the espeak-ng data directory.
    pub fn tts_data_dir(&self) -> PathBuf {
        self.kokoro_dir().join("espeak-ng-data")
    }

    /// Get the path to the TTS dict directory (for Chinese segmentation).
    pub fn tts_dict_dir(&self) -> PathBuf {
        self.kokoro_dir().join("dict")
    }

    /// Lexicon files for English input (American first, British fallback).
    pub fn tts_lexicon(&self) -> String {
        let dir = self.kokoro_dir();
        format!("{},{}", dir.join("lexicon-us-en.txt").to_string_lossy(), dir.join("lexicon-gb-en.txt").to_string_lossy())
    }

    /// Validate the model configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.model_dir.exists() {
            anyhow::bail!("Model directory does not exist: {}", self.model_dir.display());
        }

        let required_files = [self.tts_model_path(), self.tts_voices_path(), self.tts_tokens_path()];
        for path in &required_files {
            if !path.exists() {
                anyhow::bail!("Required model file not found: {}", path.display());
            }
        }

        if !self.speed.is_finite() || self.speed <= 0.0 {
            anyhow::bail!("Speed must be positive");
        }

        if self.speaker_id < 0 {
            anyhow::bail!("Speaker ID must not be negative");
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self, device: Device) {
        info!("Using device: {}", device);
        debug!("Configuration:");
        debug!("  Input directory: {}", self.input_dir.display());
        debug!("  Model directory: {}", self.model_dir.display());
        debug!("  Speaker ID: {}", self.speaker_id);
        debug!("  Speed: {}", self.speed);
        debug!("  Threads: {}", self.effective_threads(device));
    }
}

/// Plain-text rendering of a clap usage error, including the usage line.
fn usage_message(err: &clap::Error) -> String {
    err.render().to_string()
}

/// Get the default model directory (~/.chunked-tts/models).
fn default_model_dir() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".chunked-tts").join("models")
    } else {
        PathBuf::from("models")
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_two_positionals() {
        let config = AppConfig::try_parse_from(["chunked-tts", "book.txt", "out.wav"]).unwrap();
        assert_eq!(config.input, "book.txt");
        assert_eq!(config.output, PathBuf::from("out.wav"));
        assert!(config.audio_prompt.is_none());
    }

    #[test]
    fn test_three_positionals() {
        let config = AppConfig::try_parse_from(["chunked-tts", "book.txt", "out.wav", "voice.wav"]).unwrap();
        assert_eq!(config.audio_prompt, Some(PathBuf::from("voice.wav")));
    }

    #[test]
    fn test_too_few_arguments() {
        let err = AppConfig::try_parse_from(["chunked-tts", "book.txt"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
        let message = usage_message(&err);
        assert!(message.contains("Usage:"));
        assert!(message.contains("<OUTPUT>"));
    }

    #[test]
    fn test_too_many_arguments() {
        let err = AppConfig::try_parse_from(["chunked-tts", "a.txt", "b.wav", "c.wav", "d.wav"]).unwrap_err();
        assert!(err.use_stderr());
        assert!(usage_message(&err).contains("Usage:"));
    }

    #[test]
    fn test_explicit_device_skips_probe() {
        let config = AppConfig::try_parse_from(["chunked-tts", "--device", "mps", "a.txt", "b.wav"]).unwrap();
        assert_eq!(config.effective_device(), Device::Mps);
    }

    #[test]
    fn test_threads() {
        let mut config = AppConfig::try_parse_from(["chunked-tts", "a.txt", "b.wav"]).unwrap();
        assert_eq!(config.effective_threads(Device::Cuda), 1);
        assert!(config.effective_threads(Device::Cpu) >= 1);

        config.threads = 6;
        assert_eq!(config.effective_threads(Device::Cuda), 6);
    }

    #[test]
    fn test_validate_missing_model_dir() {
        let config = AppConfig::try_parse_from(["chunked-tts", "--model-dir", "/definitely/not/here", "a.txt", "b.wav"]).unwrap();
        assert!(config.validate().is_err());
    }
}
