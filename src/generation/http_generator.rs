//! HTTP client for a hosted text-to-music model.

use super::{GenerationError, GenerationRequest, MusicGenerator, RawAudio};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Serialize)]
struct SamplingParameters {
    max_new_tokens: u32,
    do_sample: bool,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    guidance_scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    inputs: &'a str,
    parameters: SamplingParameters,
}

impl<'a> GenerateBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        let settings = &request.settings;
        Self {
            inputs: &request.prompt,
            parameters: SamplingParameters {
                max_new_tokens: settings.max_new_tokens(),
                do_sample: true,
                temperature: settings.temperature,
                top_k: settings.top_k,
                top_p: settings.top_p,
                guidance_scale: settings.guidance_scale,
                seed: request.seed,
            },
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    sampling_rate: Option<u32>,
    audio: Vec<Vec<f32>>,
}

pub struct HttpMusicGenerator {
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl HttpMusicGenerator {
    /// # Arguments
    /// * `url` - Full URL of the generation endpoint
    /// * `api_token` - Optional bearer token sent with every request
    /// * `timeout_sec` - Request timeout in seconds, generation is slow
    pub fn new(url: String, api_token: Option<String>, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create generation HTTP client")?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            api_token,
        })
    }
}

#[async_trait]
impl MusicGenerator for HttpMusicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawAudio, GenerationError> {
        info!(
            "Requesting {}s of audio for prompt \"{}\"",
            request.settings.duration_secs, request.prompt
        );
        let mut http_request = self
            .client
            .post(&self.url)
            .json(&GenerateBody::from_request(request));
        if let Some(token) = &self.api_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request
            .send()
            .await
            .map_err(|err| GenerationError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Status(response.status().as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
        debug!(
            "Received {} channel(s) at {:?} Hz",
            body.audio.len(),
            body.sampling_rate
        );

        if body.audio.iter().all(|channel| channel.is_empty()) {
            return Err(GenerationError::EmptyAudio);
        }

        let sampling_rate = body
            .sampling_rate
            .unwrap_or(request.settings.sampling_rate);
        if sampling_rate == 0 {
            return Err(GenerationError::InvalidResponse(
                "sampling rate must be positive".to_string(),
            ));
        }

        Ok(RawAudio {
            sampling_rate,
            channels: body.audio,
        })
    }
}
