use crate::mood::Mood;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    C,
    D,
    E,
    F,
    G,
    A,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Major,
    Minor,
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Major => f.write_str("major"),
            Scale::Minor => f.write_str("minor"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dynamics {
    Piano,
    MezzoPiano,
    MezzoForte,
    Forte,
}

impl fmt::Display for Dynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dynamics::Piano => "piano",
            Dynamics::MezzoPiano => "mezzo-piano",
            Dynamics::MezzoForte => "mezzo-forte",
            Dynamics::Forte => "forte",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MusicParameters {
    pub tempo: u32,
    pub key: Key,
    pub scale: Scale,
    pub dynamics: Dynamics,
    pub instruments: Vec<String>,
    pub complexity: Complexity,
    pub energy_level: f64,
    pub generation_prompt: String,
}

/// Mood analysis as received from outside, where any field may be missing
/// and the mood may not be one we know.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PartialMoodProfile {
    pub mood: Option<String>,
    pub energy_level: Option<f64>,
}

impl PartialMoodProfile {
    pub const DEFAULT_ENERGY: f64 = 5.0;

    pub fn mood(&self) -> Mood {
        self.mood
            .as_deref()
            .map(Mood::parse_or_neutral)
            .unwrap_or(Mood::Neutral)
    }

    pub fn energy_level(&self) -> f64 {
        self.energy_level
            .filter(|e| e.is_finite())
            .unwrap_or(Self::DEFAULT_ENERGY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_musical_labels() {
        assert_eq!(
            serde_json::to_value(Dynamics::MezzoPiano).unwrap(),
            "mezzo-piano"
        );
        assert_eq!(serde_json::to_value(Key::E).unwrap(), "E");
        assert_eq!(serde_json::to_value(Scale::Minor).unwrap(), "minor");
        assert_eq!(serde_json::to_value(Complexity::High).unwrap(), "high");
        assert_eq!(Dynamics::MezzoForte.to_string(), "mezzo-forte");
    }

    #[test]
    fn partial_profile_defaults() {
        let empty: PartialMoodProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.mood(), Mood::Neutral);
        assert_eq!(empty.energy_level(), 5.0);

        let unknown: PartialMoodProfile =
            serde_json::from_str(r#"{"mood": "foo", "energy_level": 7.5}"#).unwrap();
        assert_eq!(unknown.mood(), Mood::Neutral);
        assert_eq!(unknown.energy_level(), 7.5);

        let sad: PartialMoodProfile = serde_json::from_str(r#"{"mood": "Sad"}"#).unwrap();
        assert_eq!(sad.mood(), Mood::Sad);
    }
}
