use super::lexicon::{ENERGY_MODIFIER_PATTERNS, KEYWORD_WEIGHT, MOOD_PATTERNS};
use super::{Mood, MoodProfile, Sentiment, SentimentScore};
use crate::sentiment::SentimentClassifier;

use std::sync::Arc;
use tracing::{debug, warn};

const SENTIMENT_FALLBACK_MOOD_CONFIDENCE: f64 = 0.6;
const MIN_MOOD_CONFIDENCE: f64 = 0.1;
const MAX_MOOD_CONFIDENCE: f64 = 0.99;

/// Rounds to the nearest multiple of 0.5, ties go to the even half-step.
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round_ties_even() / 2.0
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Accumulated keyword scores for every mood with at least one match, in table order.
pub fn mood_scores(text: &str) -> Vec<(Mood, f64)> {
    let lowered = text.to_lowercase();
    MOOD_PATTERNS
        .iter()
        .filter_map(|(mood, patterns)| {
            let hits: usize = patterns.iter().map(|p| p.find_iter(&lowered).count()).sum();
            (hits > 0).then(|| (*mood, hits as f64 * KEYWORD_WEIGHT))
        })
        .collect()
}

fn select_mood(scores: &[(Mood, f64)], sentiment: &SentimentScore) -> (Mood, f64) {
    let Some(&(mut best_mood, mut best_score)) = scores.first() else {
        let mood = match sentiment.label {
            Sentiment::Positive => Mood::Happy,
            Sentiment::Negative => Mood::Sad,
            Sentiment::Neutral => Mood::Calm,
        };
        return (mood, SENTIMENT_FALLBACK_MOOD_CONFIDENCE);
    };

    // Strictly greater, so the earliest mood in table order wins ties.
    for &(mood, score) in &scores[1..] {
        if score > best_score {
            best_mood = mood;
            best_score = score;
        }
    }

    let total: f64 = scores.iter().map(|(_, score)| score).sum();
    let confidence = (best_score / total).clamp(MIN_MOOD_CONFIDENCE, MAX_MOOD_CONFIDENCE);
    (best_mood, confidence)
}

fn compute_energy(mood: Mood, lowered_text: &str, sentiment: &SentimentScore) -> f64 {
    let mut energy = mood.base_energy();

    let strength = sentiment.confidence - 0.5;
    energy += match sentiment.label {
        Sentiment::Positive => strength * 1.5,
        Sentiment::Negative => -strength * 1.5,
        Sentiment::Neutral => strength * 0.5,
    };

    let (total, count) =
        ENERGY_MODIFIER_PATTERNS
            .iter()
            .fold((0.0, 0usize), |(total, count), (pattern, value)| {
                let hits = pattern.find_iter(lowered_text).count();
                (total + value * hits as f64, count + hits)
            });
    if count > 0 {
        energy += total / count as f64;
    }

    let (min, max) = mood.energy_range();
    round_to_half(energy.clamp(min, max))
}

/// Infers a mood profile from `text` and an already obtained sentiment reading.
///
/// Total over its inputs: blank text gives [`MoodProfile::neutral_default`], and
/// the returned energy always lies within the selected mood's range.
pub fn analyze_mood(text: &str, sentiment: SentimentScore) -> MoodProfile {
    if text.trim().is_empty() {
        return MoodProfile::neutral_default();
    }
    let sentiment = sentiment.sanitized();

    let scores = mood_scores(text);
    let (mood, mood_confidence) = select_mood(&scores, &sentiment);
    let energy_level = compute_energy(mood, &text.to_lowercase(), &sentiment);

    MoodProfile {
        mood,
        mood_confidence: round_to_hundredths(mood_confidence),
        sentiment: sentiment.label,
        sentiment_confidence: round_to_hundredths(sentiment.confidence),
        energy_level,
    }
}

/// Runs mood inference against a sentiment collaborator.
///
/// Classifier failures are logged and replaced by a neutral reading, so
/// [`MoodAnalyzer::analyze`] never fails.
#[derive(Clone)]
pub struct MoodAnalyzer {
    classifier: Arc<dyn SentimentClassifier>,
}

impl MoodAnalyzer {
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self { classifier }
    }

    pub async fn sentiment(&self, text: &str) -> SentimentScore {
        match self.classifier.classify(text).await {
            Ok(score) => score.sanitized(),
            Err(err) => {
                warn!("Sentiment classification failed, using neutral: {}", err);
                SentimentScore::neutral_fallback()
            }
        }
    }

    pub async fn analyze(&self, text: &str) -> MoodProfile {
        if text.trim().is_empty() {
            return MoodProfile::neutral_default();
        }
        let sentiment = self.sentiment(text).await;
        let profile = analyze_mood(text, sentiment);
        debug!(
            "Analyzed mood {} ({}) energy {}",
            profile.mood, profile.mood_confidence, profile.energy_level
        );
        profile
    }
}
