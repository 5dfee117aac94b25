//! Input resolution and validation.
//!
//! Runs before device selection and model loading, so every failure here is
//! cheap and reported with a clear message.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::config::AppConfig;
use crate::error::ValidationError;

/// Validated inputs for one synthesis run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub text_path: PathBuf,            // Resolved input text file
    pub text: String,                  // Trimmed, non-empty text
    pub output_path: PathBuf,          // Final WAV path, used as given
    pub audio_prompt: Option<PathBuf>, // Voice reference, used as given
}

impl AppConfig {
    /// Resolve and validate the positional arguments.
    pub fn inputs(&self) -> Result<Inputs, ValidationError> {
        resolve_inputs(&self.input_dir, &self.input, &self.output, self.audio_prompt.as_deref())
    }
}

/// Resolve an input file name under the base directory.
///
/// Only plain name components are kept: leading separators, drive prefixes,
/// `.` and `..` are dropped so the result stays inside `base`.
pub fn resolve_input_path(base: &Path, name: &str) -> PathBuf {
    let relative: PathBuf = Path::new(name).components().filter(|c| matches!(c, Component::Normal(_))).collect();
    base.join(relative)
}

/// Whitespace for trimming input text: Unicode whitespace plus the ASCII
/// information separators U+001C..U+001F.
fn is_text_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Check inputs in order: text file exists, text is non-empty, prompt exists.
pub fn resolve_inputs(input_dir: &Path, input: &str, output: &Path, audio_prompt: Option<&Path>) -> Result<Inputs, ValidationError> {
    let text_path = resolve_input_path(input_dir, input);

    if !text_path.is_file() {
        return Err(ValidationError::InputNotFound(text_path));
    }

    let raw = match fs::read_to_string(&text_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ValidationError::InputNotFound(text_path)),
        Err(source) => return Err(ValidationError::Unreadable { path: text_path, source }),
    };

    let text = raw.trim_matches(is_text_space);
    if text.is_empty() {
        return Err(ValidationError::EmptyInput(text_path));
    }

    if let Some(prompt) = audio_prompt
        && !prompt.is_file()
    {
        return Err(ValidationError::PromptNotFound(prompt.to_path_buf()));
    }

    Ok(Inputs { text_path, text: text.to_string(), output_path: output.to_path_buf(), audio_prompt: audio_prompt.map(Path::to_path_buf) })
}
