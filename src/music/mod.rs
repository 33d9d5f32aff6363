//! Parameter mapping: turns a [`crate::mood::MoodProfile`] into musical parameters.

mod models;
mod parameters;

pub use models::{Complexity, Dynamics, Key, MusicParameters, PartialMoodProfile, Scale};
pub use parameters::{
    build_generation_prompt, dynamics_for_energy, get_music_parameters, music_parameters_for,
    scale_tempo, style_for, MoodStyle,
};
