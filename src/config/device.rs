//! Inference device selection.
//!
//! Availability is probed once at startup and the chosen [`Device`] is handed
//! to the model loader explicitly.

use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Hardware target for model inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CPU inference (fallback, always available)
    #[default]
    Cpu,
    /// NVIDIA CUDA acceleration
    Cuda,
    /// Apple Metal / Neural Engine (Apple Silicon only)
    Mps,
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
            Device::Mps => write!(f, "mps"),
        }
    }
}

impl Device {
    /// Convert to the sherpa-rs execution provider string.
    ///
    /// Apple Silicon acceleration goes through ONNX Runtime's CoreML provider.
    pub fn as_sherpa_provider(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Mps => "coreml",
        }
    }
}

/// Accelerator availability signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    pub cuda: bool,
    pub mps: bool,
}

impl Availability {
    /// Probe the host for accelerators this build can drive.
    ///
    /// CUDA is only reported when sherpa-onnx was built with CUDA support
    /// (the `cuda` feature); prebuilt binaries are CPU-only.
    pub fn probe() -> Self {
        Self { cuda: CUDA_BUILT && has_nvidia_gpu(), mps: has_apple_gpu() }
    }

    /// Pick a device: CUDA, then MPS, then CPU.
    pub fn select(&self) -> Device {
        if self.cuda {
            Device::Cuda
        } else if self.mps {
            Device::Mps
        } else {
            Device::Cpu
        }
    }
}

/// Whether sherpa-onnx was built with the CUDA execution provider.
pub const CUDA_BUILT: bool = cfg!(feature = "cuda");

/// Reject devices this build cannot run on.
///
/// # Errors
/// Returns an error for CUDA without the `cuda` feature, or MPS off macOS.
pub fn ensure_supported(device: Device) -> Result<()> {
    match device {
        Device::Cuda if !CUDA_BUILT => bail!("device 'cuda' requested but this build has no CUDA support (rebuild with --no-default-features --features cuda)"),
        Device::Mps if !cfg!(target_os = "macos") => bail!("device 'mps' is only available on macOS"),
        _ => Ok(()),
    }
}

/// Probe the host and select the best available device.
pub fn detect_device() -> Device {
    let availability = Availability::probe();
    let device = availability.select();
    info!("Detected accelerators: cuda={}, mps={}", availability.cuda, availability.mps);
    device
}

/// Check if an NVIDIA GPU is available (Linux only).
#[cfg(target_os = "linux")]
fn has_nvidia_gpu() -> bool {
    use std::path::Path;

    let nvidia_paths = [
        "/dev/nvidia0",
        "/dev/nvidiactl",
        "/dev/nvidia-uvm",
        // Jetson devices
        "/dev/nvhost-ctrl",
        "/dev/nvhost-ctrl-gpu",
        "/etc/nv_tegra_release",
    ];

    nvidia_paths.iter().any(|p| Path::new(p).exists())
}

#[cfg(not(target_os = "linux"))]
fn has_nvidia_gpu() -> bool {
    false
}

fn has_apple_gpu() -> bool {
    cfg!(all(target_os = "macos", target_arch = "aarch64"))
}
