//! chunked-tts - Batch text-to-speech for long documents.
//!
//! Reads a text file, splits it into fixed-size chunks, synthesizes each chunk
//! with a Kokoro model (via sherpa-rs), and joins the chunk audio into a single
//! WAV file.

mod audio;
mod config;
mod error;
mod input;
mod pipeline;
mod tts;

use anyhow::Result;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use config::AppConfig;
use tts::Synthesizer;

fn main() -> Result<()> {
    // Parse command line arguments (exits with status 1 on usage errors)
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🎙️  chunked-tts v{}", env!("CARGO_PKG_VERSION"));

    // Validate inputs before touching the device or the model
    let inputs = match config.inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };
    debug!("Input text ({}):\n{}", inputs.text_path.display(), inputs.text);

    let device = config.effective_device();
    config.log_config(device);

    let mut synthesizer = Synthesizer::load(device, &config)?;

    let summary = pipeline::synthesize(&mut synthesizer, &inputs.text, &inputs.output_path, inputs.audio_prompt.as_deref())?;
    debug!("Run summary: {}", serde_json::to_string(&summary)?);

    Ok(())
}
