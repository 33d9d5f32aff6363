//! Static keyword tables used by mood inference.

use super::Mood;
use lazy_static::lazy_static;
use regex::Regex;

/// Each keyword occurrence adds this much to its mood's score.
pub const KEYWORD_WEIGHT: f64 = 1.5;

pub struct MoodLexicon {
    pub mood: Mood,
    pub keywords: &'static [&'static str],
    pub base_energy: f64,
    pub energy_range: (f64, f64),
}

pub const MOOD_LEXICONS: [MoodLexicon; 6] = [
    MoodLexicon {
        mood: Mood::Happy,
        keywords: &[
            "happy", "excited", "joy", "joyful", "delighted", "cheerful", "glad", "pleased",
            "ecstatic",
        ],
        base_energy: 8.0,
        energy_range: (6.0, 10.0),
    },
    MoodLexicon {
        mood: Mood::Sad,
        keywords: &[
            "sad",
            "unhappy",
            "depressed",
            "miserable",
            "heartbroken",
            "gloomy",
            "sorrow",
            "lonely",
            "blue",
        ],
        base_energy: 3.5,
        energy_range: (2.0, 5.0),
    },
    MoodLexicon {
        mood: Mood::Calm,
        keywords: &[
            "calm", "peaceful", "relaxed", "serene", "tranquil", "quiet", "still", "chill",
            "mellow",
        ],
        base_energy: 5.0,
        energy_range: (4.0, 7.0),
    },
    MoodLexicon {
        mood: Mood::Energetic,
        keywords: &[
            "energetic",
            "active",
            "lively",
            "dynamic",
            "vibrant",
            "pumped",
            "exhilarated",
            "energized",
        ],
        base_energy: 9.0,
        energy_range: (7.0, 10.0),
    },
    MoodLexicon {
        mood: Mood::Mysterious,
        keywords: &[
            "mysterious",
            "curious",
            "intrigued",
            "puzzled",
            "enigmatic",
            "cryptic",
            "wondering",
        ],
        base_energy: 6.5,
        energy_range: (5.0, 8.0),
    },
    MoodLexicon {
        mood: Mood::Romantic,
        keywords: &[
            "romantic",
            "loving",
            "affectionate",
            "passionate",
            "intimate",
            "tender",
            "love",
            "heart",
            "adore",
            "cherish",
            "desire",
            "yearning",
            "amorous",
            "enamored",
        ],
        base_energy: 7.0,
        energy_range: (6.0, 9.0),
    },
];

const NEUTRAL_BASE_ENERGY: f64 = 5.0;
const NEUTRAL_ENERGY_RANGE: (f64, f64) = (3.0, 8.0);

pub const ENERGY_MODIFIERS: &[(&str, f64)] = &[
    ("excited", 1.2),
    ("energetic", 1.3),
    ("pumped", 1.5),
    ("dynamic", 0.8),
    ("lively", 1.0),
    ("vibrant", 0.9),
    ("active", 0.8),
    ("hyper", 1.8),
    ("calm", -0.8),
    ("relaxed", -0.7),
    ("peaceful", -0.6),
    ("serene", -0.7),
    ("tired", -1.2),
    ("exhausted", -1.5),
    ("sleepy", -1.0),
    ("lethargic", -1.1),
    ("romantic", 0.5),
    ("loving", 0.4),
    ("passionate", 0.7),
    ("intimate", 0.3),
];

impl Mood {
    pub fn base_energy(&self) -> f64 {
        lexicon_for(*self)
            .map(|l| l.base_energy)
            .unwrap_or(NEUTRAL_BASE_ENERGY)
    }

    /// Inclusive bounds the energy level of this mood is clamped into.
    pub fn energy_range(&self) -> (f64, f64) {
        lexicon_for(*self)
            .map(|l| l.energy_range)
            .unwrap_or(NEUTRAL_ENERGY_RANGE)
    }
}

pub fn lexicon_for(mood: Mood) -> Option<&'static MoodLexicon> {
    MOOD_LEXICONS.iter().find(|l| l.mood == mood)
}

fn word_pattern(word: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
        .expect("Keyword patterns are built from static words")
}

lazy_static! {
    /// Whole-word patterns for every mood keyword, grouped by mood in table order.
    pub static ref MOOD_PATTERNS: Vec<(Mood, Vec<Regex>)> = MOOD_LEXICONS
        .iter()
        .map(|lexicon| {
            let patterns = lexicon.keywords.iter().map(|kw| word_pattern(kw)).collect();
            (lexicon.mood, patterns)
        })
        .collect();

    pub static ref ENERGY_MODIFIER_PATTERNS: Vec<(Regex, f64)> = ENERGY_MODIFIERS
        .iter()
        .map(|(word, value)| (word_pattern(word), *value))
        .collect();
}
