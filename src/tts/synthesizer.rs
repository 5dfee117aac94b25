//! Kokoro speech model driven through sherpa-rs.
//!
//! Kokoro has no zero-shot cloning: every voice is a stock speaker embedding.
//! An audio prompt is therefore mapped to the stock English voice whose pitch
//! is closest to the prompt's, and that speaker renders every chunk.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use sherpa_rs::OnnxConfig;
use sherpa_rs::tts::{CommonTtsConfig, KokoroTts, KokoroTtsConfig};
use tracing::{debug, info};

use super::SpeechModel;
use crate::audio::Waveform;
use crate::audio::pitch::median_pitch;
use crate::audio::wav::read_wav;
use crate::config::{AppConfig, Device, ensure_supported};

/// Kokoro output sample rate.
const KOKORO_SAMPLE_RATE: u32 = 24000;

/// English speakers of kokoro-multi-lang-v1_0 (af_*, am_*, bf_*, bm_*).
const ENGLISH_SPEAKERS: RangeInclusive<i32> = 0..=27;

/// Sentence rendered by each stock voice to measure its pitch.
const CALIBRATION_TEXT: &str = "The quick brown fox jumps over the lazy dog, and then it rests in the warm afternoon sun.";

/// Engine that renders text with a stock speaker voice.
pub trait VoiceEngine {
    /// Render `text` with speaker `speaker_id` into mono samples.
    fn render(&mut self, text: &str, speaker_id: i32, speed: f32) -> Result<Vec<f32>>;
}

impl VoiceEngine for KokoroTts {
    fn render(&mut self, text: &str, speaker_id: i32, speed: f32) -> Result<Vec<f32>> {
        let audio = self.create(text, speaker_id, speed).map_err(|e| anyhow!("TTS generation failed: {}", e))?;
        Ok(audio.samples)
    }
}

/// Text-to-speech synthesizer using Kokoro models.
pub struct Synthesizer<E: VoiceEngine = KokoroTts> {
    engine: E,                                 // Voice engine (Kokoro in production)
    sample_rate: u32,                          // Output sample rate (24kHz for Kokoro)
    speaker_id: i32,                           // Speaker used when no prompt is given
    speed: f32,                                // Speech speed multiplier
    voice_pitches: Option<Vec<(i32, f32)>>,    // Median pitch per stock voice, measured lazily
    prompt_voice: Option<(PathBuf, i32)>,      // Last prompt and the speaker it matched
}

impl Synthesizer<KokoroTts> {
    /// Load the Kokoro model onto the given device.
    ///
    /// # Arguments
    /// * `device` - Inference device selected at startup
    /// * `config` - Application configuration (model paths, voice, speed)
    ///
    /// # Errors
    /// Returns an error if this build cannot drive `device` or the model
    /// configuration is invalid (e.g., missing model files).
    pub fn load(device: Device, config: &AppConfig) -> Result<Self> {
        ensure_supported(device)?;
        config.validate()?;

        let threads = config.effective_threads(device);
        info!("Loading Kokoro model on {} ({} threads)", device, threads);
        debug!("Kokoro speaker ID: {}, speed: {}", config.speaker_id, config.speed);

        let tts_config = KokoroTtsConfig {
            model: config.tts_model_path().to_string_lossy().to_string(),
            voices: config.tts_voices_path().to_string_lossy().to_string(),
            tokens: config.tts_tokens_path().to_string_lossy().to_string(),
            data_dir: config.tts_data_dir().to_string_lossy().to_string(),
            dict_dir: config.tts_dict_dir().to_string_lossy().to_string(),
            lexicon: config.tts_lexicon(),
            lang: String::new(),              // English uses lexicon files
            length_scale: 1.0 / config.speed, // length_scale is inverse of speed
            onnx_config: OnnxConfig {
                provider: device.as_sherpa_provider().to_string(),
                num_threads: threads.try_into().unwrap_or(1),
                debug: config.verbose,
            },
            common_config: CommonTtsConfig { max_num_sentences: 1, ..Default::default() }, // Kokoro only supports 1
        };

        let tts = KokoroTts::new(tts_config);

        Ok(Self::with_engine(tts, KOKORO_SAMPLE_RATE, config.speaker_id, config.speed))
    }
}

impl<E: VoiceEngine> Synthesizer<E> {
    pub fn with_engine(engine: E, sample_rate: u32, speaker_id: i32, speed: f32) -> Self {
        Self { engine, sample_rate, speaker_id, speed, voice_pitches: None, prompt_voice: None }
    }

    /// Speaker for this request: the configured one, or the stock voice
    /// closest in pitch to the audio prompt.
    fn speaker_for(&mut self, audio_prompt: Option<&Path>) -> Result<i32> {
        let Some(prompt) = audio_prompt else {
            return Ok(self.speaker_id);
        };

        if let Some((path, id)) = &self.prompt_voice
            && path == prompt
        {
            return Ok(*id);
        }

        let reference = read_wav(prompt).with_context(|| format!("failed to read audio prompt {}", prompt.display()))?;
        let target = median_pitch(&reference).with_context(|| format!("no voiced speech found in audio prompt {}", prompt.display()))?;

        let id = nearest_voice(target, self.voice_pitches()?).context("no stock voice could be profiled")?;
        info!("🎭 Audio prompt {} (~{:.0} Hz) matched to speaker {}", prompt.display(), target, id);

        self.prompt_voice = Some((prompt.to_path_buf(), id));
        Ok(id)
    }

    /// Median pitch of every English stock voice, measured on first use.
    fn voice_pitches(&mut self) -> Result<&[(i32, f32)]> {
        if self.voice_pitches.is_none() {
            info!("Profiling {} stock voices for prompt matching", ENGLISH_SPEAKERS.count());
            let mut pitches = Vec::new();
            for id in ENGLISH_SPEAKERS {
                let samples = self.engine.render(CALIBRATION_TEXT, id, self.speed)?;
                match median_pitch(&Waveform::mono(samples, self.sample_rate)) {
                    Some(pitch) => {
                        debug!("Speaker {}: {:.1} Hz", id, pitch);
                        pitches.push((id, pitch));
                    }
                    None => debug!("Speaker {}: no voiced frames, skipped", id),
                }
            }
            self.voice_pitches = Some(pitches);
        }
        Ok(self.voice_pitches.as_deref().unwrap_or_default())
    }
}

/// Voice whose pitch is closest to `target` on a log (musical) scale.
fn nearest_voice(target: f32, pitches: &[(i32, f32)]) -> Option<i32> {
    pitches.iter().min_by(|a, b| (a.1 / target).log2().abs().total_cmp(&(b.1 / target).log2().abs())).map(|&(id, _)| id)
}

impl<E: VoiceEngine> SpeechModel for Synthesizer<E> {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn generate(&mut self, text: &str, audio_prompt: Option<&Path>) -> Result<Waveform> {
        let speaker_id = self.speaker_for(audio_prompt)?;

        debug!("Synthesizing {} characters with speaker {}", text.chars().count(), speaker_id);

        let samples = self.engine.render(text, speaker_id, self.speed)?;

        debug!("🎵 Generated speech ({} samples)", samples.len());
        Ok(Waveform::mono(samples, self.sample_rate))
    }
}
