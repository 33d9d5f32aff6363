//! Mood inference: turns free text plus a sentiment reading into a [`MoodProfile`].

mod analyzer;
pub mod lexicon;
mod models;

pub use analyzer::{analyze_mood, mood_scores, round_to_half, MoodAnalyzer};
pub use models::{Mood, MoodProfile, Sentiment, SentimentScore};
