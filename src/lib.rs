//! MelodAI server library
//!
//! Turns free text into a mood profile, maps it to music parameters and
//! drives a remote generative-audio model. Exposed for the binaries and the
//! end-to-end tests.

pub mod composer;
pub mod config;
pub mod generation;
pub mod mood;
pub mod music;
pub mod sentiment;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

pub use composer::{Composer, Composition};
pub use mood::{analyze_mood, MoodAnalyzer, MoodProfile};
pub use music::{get_music_parameters, MusicParameters};
pub use server::{run_server, RequestsLoggingLevel};
pub use user::{SqliteUserStore, UserManager};
