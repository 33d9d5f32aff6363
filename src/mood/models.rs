use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Calm,
    Energetic,
    Mysterious,
    Romantic,
    Neutral,
}

impl Mood {
    /// Moods that can be detected from keywords, in tie-break order.
    pub const DETECTABLE: [Mood; 6] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Calm,
        Mood::Energetic,
        Mood::Mysterious,
        Mood::Romantic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Calm => "calm",
            Mood::Energetic => "energetic",
            Mood::Mysterious => "mysterious",
            Mood::Romantic => "romantic",
            Mood::Neutral => "neutral",
        }
    }

    /// Parses a mood coming from untrusted input, anything unknown is neutral.
    pub fn parse_or_neutral(value: &str) -> Mood {
        Mood::from_str(value).unwrap_or(Mood::Neutral)
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "calm" => Ok(Mood::Calm),
            "energetic" => Ok(Mood::Energetic),
            "mysterious" => Ok(Mood::Mysterious),
            "romantic" => Ok(Mood::Romantic),
            "neutral" => Ok(Mood::Neutral),
            _ => bail!("Unknown mood {}", s),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => bail!("Unknown sentiment {}", s),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sentiment label with the classifier's confidence in it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: Sentiment,
    pub confidence: f64,
}

impl SentimentScore {
    pub fn new(label: Sentiment, confidence: f64) -> Self {
        Self { label, confidence }
    }

    /// What we use whenever the classifier cannot give an answer.
    pub fn neutral_fallback() -> Self {
        Self::new(Sentiment::Neutral, 0.5)
    }

    /// Clamps the confidence into [0, 1], non-finite readings become the fallback.
    pub fn sanitized(self) -> Self {
        if !self.confidence.is_finite() {
            return Self::neutral_fallback();
        }
        Self::new(self.label, self.confidence.clamp(0.0, 1.0))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub mood: Mood,
    pub mood_confidence: f64,
    pub sentiment: Sentiment,
    pub sentiment_confidence: f64,
    pub energy_level: f64,
}

impl MoodProfile {
    pub fn neutral_default() -> Self {
        Self {
            mood: Mood::Neutral,
            mood_confidence: 0.5,
            sentiment: Sentiment::Neutral,
            sentiment_confidence: 0.5,
            energy_level: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moods_case_insensitively() {
        assert_eq!(Mood::from_str("HAPPY").unwrap(), Mood::Happy);
        assert_eq!(Mood::from_str(" romantic ").unwrap(), Mood::Romantic);
        assert!(Mood::from_str("foo").is_err());
        assert_eq!(Mood::parse_or_neutral("foo"), Mood::Neutral);
    }

    #[test]
    fn serializes_lowercase_labels() {
        let profile = MoodProfile::neutral_default();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["mood"], "neutral");
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["energy_level"], 5.0);
    }

    #[test]
    fn sanitizes_sentiment_confidence() {
        let score = SentimentScore::new(Sentiment::Positive, 1.7).sanitized();
        assert_eq!(score.confidence, 1.0);

        let score = SentimentScore::new(Sentiment::Negative, f64::NAN).sanitized();
        assert_eq!(score, SentimentScore::neutral_fallback());
    }
}
