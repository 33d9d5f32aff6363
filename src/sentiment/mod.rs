//! Sentiment collaborator used by mood inference.

mod http_classifier;

pub use http_classifier::HttpSentimentClassifier;

use crate::mood::SentimentScore;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Sentiment request failed: {0}")]
    Request(String),

    #[error("Sentiment service answered with status {0}")]
    Status(u16),

    #[error("Invalid sentiment response: {0}")]
    InvalidResponse(String),
}

/// Classifies text as positive, negative or neutral.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentScore, SentimentError>;
}

/// Stand-in when no sentiment service is configured.
pub struct NoOpSentimentClassifier;

#[async_trait]
impl SentimentClassifier for NoOpSentimentClassifier {
    async fn classify(&self, _text: &str) -> Result<SentimentScore, SentimentError> {
        Ok(SentimentScore::neutral_fallback())
    }
}
