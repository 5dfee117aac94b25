//! Text-to-speech: chunking, the model abstraction and the Kokoro backend.

mod chunker;
mod model;
mod synthesizer;

pub use chunker::{MAX_CHUNK_CHARS, chunk_text};
pub use model::SpeechModel;
pub use synthesizer::Synthesizer;
