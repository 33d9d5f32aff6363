//! HTTP client for a hosted text-classification model.
//!
//! Speaks the Hugging Face inference wire format: the request body is
//! `{"inputs": "<text>"}` and the answer a list of `{label, score}` pairs,
//! possibly nested in an outer list (one entry per input).

use super::{SentimentClassifier, SentimentError};
use crate::mood::{Sentiment, SentimentScore};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize, Debug, Clone)]
pub(super) struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn into_candidates(self) -> Vec<LabelScore> {
        match self {
            ClassificationResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassificationResponse::Flat(candidates) => candidates,
        }
    }
}

/// Maps model labels to sentiments, both plain names and `LABEL_n` indices.
fn parse_label(label: &str) -> Option<Sentiment> {
    match label.trim().to_lowercase().as_str() {
        "negative" | "label_0" => Some(Sentiment::Negative),
        "neutral" | "label_1" => Some(Sentiment::Neutral),
        "positive" | "label_2" => Some(Sentiment::Positive),
        _ => None,
    }
}

fn pick_sentiment(candidates: &[LabelScore]) -> Result<SentimentScore, SentimentError> {
    let best = candidates
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| SentimentError::InvalidResponse("no labels returned".to_string()))?;
    let label = parse_label(&best.label)
        .ok_or_else(|| SentimentError::InvalidResponse(format!("unknown label {}", best.label)))?;
    Ok(SentimentScore::new(label, best.score))
}

pub struct HttpSentimentClassifier {
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl HttpSentimentClassifier {
    /// # Arguments
    /// * `url` - Full URL of the classification endpoint
    /// * `api_token` - Optional bearer token sent with every request
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(url: String, api_token: Option<String>, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create sentiment HTTP client")?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            api_token,
        })
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&ClassificationRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SentimentError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SentimentError::Status(response.status().as_u16()));
        }

        let body: ClassificationResponse = response
            .json()
            .await
            .map_err(|err| SentimentError::InvalidResponse(err.to_string()))?;
        let candidates = body.into_candidates();
        debug!("Sentiment candidates: {:?}", candidates);

        pick_sentiment(&candidates)
    }
}
