//! Configuration module for chunked-tts.
//!
//! Provides CLI argument parsing and inference device selection.

#[allow(clippy::module_inception)]
mod config;
mod device;

pub use config::AppConfig;
pub use device::{Device, ensure_supported};
