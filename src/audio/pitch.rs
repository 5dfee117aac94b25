//! Fundamental frequency estimation.
//!
//! Normalized autocorrelation over short frames of a decimated mono signal.
//! Used to compare a reference recording against stock voices.

use super::Waveform;

/// Rate the signal is decimated to before analysis.
const ANALYSIS_RATE: u32 = 8000;

/// Pitch search range covering adult and child speech.
const MIN_PITCH_HZ: f32 = 60.0;
const MAX_PITCH_HZ: f32 = 400.0;

/// Analysis frame length in seconds (hop is half a frame).
const FRAME_SECS: f32 = 0.04;

/// Frames quieter than this RMS are skipped.
const SILENCE_RMS: f32 = 0.01;

/// Minimum correlation peak for a frame to count as voiced.
const VOICING_THRESHOLD: f32 = 0.5;

/// Median fundamental frequency over voiced frames, in Hz.
///
/// Returns `None` when no frame is voiced (silence, noise, or too short).
pub fn median_pitch(waveform: &Waveform) -> Option<f32> {
    let mono = waveform.to_mono();
    let factor = (waveform.sample_rate() / ANALYSIS_RATE).max(1) as usize;
    let rate = waveform.sample_rate() as f32 / factor as f32;
    let signal: Vec<f32> = mono.chunks(factor).map(|c| c.iter().sum::<f32>() / c.len() as f32).collect();

    let frame_len = (rate * FRAME_SECS) as usize;
    let min_lag = ((rate / MAX_PITCH_HZ).floor() as usize).max(1);
    let max_lag = (rate / MIN_PITCH_HZ).ceil() as usize;
    let span = frame_len + max_lag + 1;
    let hop = (frame_len / 2).max(1);

    let mut pitches = Vec::new();
    let mut start = 0;
    while start + span <= signal.len() {
        if let Some(pitch) = frame_pitch(&signal[start..start + span], frame_len, min_lag, max_lag, rate) {
            pitches.push(pitch);
        }
        start += hop;
    }

    if pitches.is_empty() {
        return None;
    }
    pitches.sort_by(|a, b| a.total_cmp(b));
    Some(pitches[pitches.len() / 2])
}

fn frame_pitch(frame: &[f32], len: usize, min_lag: usize, max_lag: usize, rate: f32) -> Option<f32> {
    let head = &frame[..len];
    let energy: f32 = head.iter().map(|x| x * x).sum();
    if (energy / len as f32).sqrt() < SILENCE_RMS {
        return None;
    }

    let corr: Vec<f32> = (min_lag..=max_lag)
        .map(|lag| {
            let tail = &frame[lag..lag + len];
            let dot: f32 = head.iter().zip(tail).map(|(a, b)| a * b).sum();
            let tail_energy: f32 = tail.iter().map(|x| x * x).sum();
            let denom = (energy * tail_energy).sqrt();
            if denom > 0.0 { dot / denom } else { 0.0 }
        })
        .collect();

    let peak = corr.iter().copied().fold(f32::MIN, f32::max);
    if peak < VOICING_THRESHOLD {
        return None;
    }

    // First local maximum near the global peak, so multiples of the period lose.
    let idx = (0..corr.len()).find(|&i| {
        let c = corr[i];
        c >= 0.9 * peak && (i == 0 || c >= corr[i - 1]) && (i + 1 == corr.len() || c >= corr[i + 1])
    })?;

    Some(rate / (min_lag + idx) as f32)
}
