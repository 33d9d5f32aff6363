use super::models::{Complexity, Dynamics, Key, MusicParameters, PartialMoodProfile, Scale};
use crate::mood::{Mood, MoodProfile};

/// Static musical character of a mood.
pub struct MoodStyle {
    pub tempo: u32,
    pub key: Key,
    pub scale: Scale,
    pub dynamics: Dynamics,
    pub instruments: [&'static str; 6],
    pub complexity: Complexity,
    pub energy_level: f64,
    pub description: &'static str,
}

const HAPPY: MoodStyle = MoodStyle {
    tempo: 120,
    key: Key::C,
    scale: Scale::Major,
    dynamics: Dynamics::MezzoForte,
    instruments: [
        "piano",
        "violin",
        "flute",
        "acoustic guitar",
        "mandolin",
        "celesta",
    ],
    complexity: Complexity::Medium,
    energy_level: 8.0,
    description: "upbeat cheerful joyful positive uplifting",
};

const SAD: MoodStyle = MoodStyle {
    tempo: 60,
    key: Key::D,
    scale: Scale::Minor,
    dynamics: Dynamics::Piano,
    instruments: [
        "cello",
        "piano",
        "harp",
        "viola",
        "english horn",
        "glass harmonica",
    ],
    complexity: Complexity::Low,
    energy_level: 3.0,
    description: "melancholic sorrowful emotional reflective",
};

const CALM: MoodStyle = MoodStyle {
    tempo: 80,
    key: Key::G,
    scale: Scale::Major,
    dynamics: Dynamics::Piano,
    instruments: [
        "harp",
        "flute",
        "strings",
        "piano",
        "wind chimes",
        "ambient pad",
    ],
    complexity: Complexity::Low,
    energy_level: 4.0,
    description: "peaceful relaxing ambient soothing tranquil",
};

const ENERGETIC: MoodStyle = MoodStyle {
    tempo: 140,
    key: Key::F,
    scale: Scale::Major,
    dynamics: Dynamics::Forte,
    instruments: [
        "drums",
        "electric guitar",
        "trumpet",
        "saxophone",
        "bass guitar",
        "tambourine",
    ],
    complexity: Complexity::High,
    energy_level: 9.0,
    description: "energetic powerful driving intense exciting",
};

const MYSTERIOUS: MoodStyle = MoodStyle {
    tempo: 90,
    key: Key::E,
    scale: Scale::Minor,
    dynamics: Dynamics::MezzoPiano,
    instruments: [
        "cello",
        "bassoon",
        "harp",
        "theremin",
        "vibraphone",
        "waterphone",
    ],
    complexity: Complexity::Medium,
    energy_level: 6.0,
    description: "mysterious suspenseful enigmatic atmospheric",
};

const ROMANTIC: MoodStyle = MoodStyle {
    tempo: 100,
    key: Key::A,
    scale: Scale::Major,
    dynamics: Dynamics::MezzoPiano,
    instruments: [
        "violin",
        "piano",
        "cello",
        "french horn",
        "clarinet",
        "harp",
    ],
    complexity: Complexity::Medium,
    energy_level: 7.0,
    description: "romantic loving passionate emotional tender",
};

const NEUTRAL: MoodStyle = MoodStyle {
    tempo: 100,
    key: Key::C,
    scale: Scale::Major,
    dynamics: Dynamics::MezzoPiano,
    instruments: [
        "piano",
        "acoustic guitar",
        "strings",
        "flute",
        "soft synth",
        "xylophone",
    ],
    complexity: Complexity::Medium,
    energy_level: 5.0,
    description: "balanced neutral pleasant background",
};

pub fn style_for(mood: Mood) -> &'static MoodStyle {
    match mood {
        Mood::Happy => &HAPPY,
        Mood::Sad => &SAD,
        Mood::Calm => &CALM,
        Mood::Energetic => &ENERGETIC,
        Mood::Mysterious => &MYSTERIOUS,
        Mood::Romantic => &ROMANTIC,
        Mood::Neutral => &NEUTRAL,
    }
}

/// Scales `base_tempo` between 80% (energy 0) and 120% (energy 10).
/// Energy outside [0, 10] is clamped first.
pub fn scale_tempo(base_tempo: u32, energy_level: f64) -> u32 {
    let energy = if energy_level.is_finite() {
        energy_level.clamp(0.0, 10.0)
    } else {
        PartialMoodProfile::DEFAULT_ENERGY
    };
    let factor = 0.8 + 0.4 * (energy / 10.0);
    (base_tempo as f64 * factor).round_ties_even() as u32
}

pub fn dynamics_for_energy(energy_level: f64) -> Dynamics {
    if energy_level >= 8.0 {
        Dynamics::Forte
    } else if energy_level >= 6.0 {
        Dynamics::MezzoForte
    } else if energy_level >= 4.0 {
        Dynamics::MezzoPiano
    } else {
        Dynamics::Piano
    }
}

/// Assembles the text prompt handed to the audio generator.
pub fn build_generation_prompt(
    description: &str,
    tempo: u32,
    key: Key,
    scale: Scale,
    instruments: &[&str],
    dynamics: Dynamics,
) -> String {
    let lead = if instruments.len() > 2 {
        &instruments[..3]
    } else {
        instruments
    };
    [
        description.to_string(),
        format!("{} bpm", tempo),
        format!("{} {}", key, scale),
        format!("with {}", lead.join(", ")),
        format!("{} dynamics", dynamics),
    ]
    .join(", ")
}

pub fn music_parameters_for(mood: Mood, energy_level: f64) -> MusicParameters {
    let style = style_for(mood);
    let tempo = scale_tempo(style.tempo, energy_level);
    let dynamics = dynamics_for_energy(energy_level);
    let generation_prompt = build_generation_prompt(
        style.description,
        tempo,
        style.key,
        style.scale,
        &style.instruments,
        dynamics,
    );

    MusicParameters {
        tempo,
        key: style.key,
        scale: style.scale,
        dynamics,
        instruments: style.instruments.iter().map(|i| i.to_string()).collect(),
        complexity: style.complexity,
        energy_level,
        generation_prompt,
    }
}

pub fn get_music_parameters(profile: &MoodProfile) -> MusicParameters {
    music_parameters_for(profile.mood, profile.energy_level)
}

impl PartialMoodProfile {
    pub fn music_parameters(&self) -> MusicParameters {
        music_parameters_for(self.mood(), self.energy_level())
    }
}
