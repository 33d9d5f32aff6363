//! Generative-audio collaborator: prompt in, audio clip out.

mod audio;
mod http_generator;

pub use audio::{encode_wav, normalize_peak, prepare_clip, to_mono, PEAK_TARGET};
pub use http_generator::HttpMusicGenerator;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation service answered with status {0}")]
    Status(u16),

    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),

    #[error("Generated audio is empty")]
    EmptyAudio,

    #[error("Failed to encode audio: {0}")]
    Encoding(String),
}

/// Sampling settings forwarded to the audio model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSettings {
    pub duration_secs: u32,
    pub tokens_per_second: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub guidance_scale: f32,
    pub sampling_rate: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            duration_secs: 16,
            tokens_per_second: 50,
            temperature: 1.0,
            top_k: 250,
            top_p: 0.8,
            guidance_scale: 3.0,
            sampling_rate: 32_000,
        }
    }
}

impl GenerationSettings {
    pub fn max_new_tokens(&self) -> u32 {
        self.duration_secs * self.tokens_per_second
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub settings: GenerationSettings,
    pub seed: Option<u64>,
}

/// Raw model output, one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    pub sampling_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

#[async_trait]
pub trait MusicGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawAudio, GenerationError>;
}
