//! Post-processing of generated audio into a playable WAV clip.

use super::{GenerationError, RawAudio};
use std::io::Cursor;

/// Peak amplitude after normalization, leaves a little headroom.
pub const PEAK_TARGET: f32 = 0.95;

const SILENCE_FLOOR: f32 = 1e-8;

/// Averages all channels into one. Shorter channels count as silent past their end.
pub fn to_mono(channels: &[Vec<f32>]) -> Vec<f32> {
    let Some(length) = channels.iter().map(Vec::len).max() else {
        return Vec::new();
    };
    if channels.len() == 1 {
        return channels[0].clone();
    }

    let count = channels.len() as f32;
    (0..length)
        .map(|i| {
            let sum: f32 = channels
                .iter()
                .map(|c| c.get(i).copied().unwrap_or(0.0))
                .sum();
            sum / count
        })
        .collect()
}

/// Scales samples so the loudest one hits [`PEAK_TARGET`].
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0f32, |peak, s| peak.max(s.abs()))
        .max(SILENCE_FLOOR);
    for sample in samples.iter_mut() {
        *sample = if sample.is_finite() {
            *sample / peak * PEAK_TARGET
        } else {
            0.0
        };
    }
}

/// Encodes mono samples in [-1, 1] as 16-bit PCM WAV.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, GenerationError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)
            .map_err(|err| GenerationError::Encoding(err.to_string()))?;
        for sample in samples {
            let amplitude = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(amplitude)
                .map_err(|err| GenerationError::Encoding(err.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|err| GenerationError::Encoding(err.to_string()))?;
    }
    Ok(buffer.into_inner())
}

/// Mono mix, peak normalization and WAV encoding in one go.
pub fn prepare_clip(audio: &RawAudio) -> Result<Vec<u8>, GenerationError> {
    let mut samples = to_mono(&audio.channels);
    if samples.is_empty() {
        return Err(GenerationError::EmptyAudio);
    }
    normalize_peak(&mut samples);
    encode_wav(&samples, audio.sampling_rate)
}
