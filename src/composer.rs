//! Orchestrates mood inference, parameter mapping and audio generation.

use crate::generation::{
    prepare_clip, GenerationError, GenerationRequest, GenerationSettings, MusicGenerator,
};
use crate::mood::{MoodAnalyzer, MoodProfile};
use crate::music::{get_music_parameters, MusicParameters};

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Sample inputs offered to new users, one per detectable mood.
pub const EXAMPLE_INPUTS: [&str; 6] = [
    "I'm so happy and excited for the weekend!",
    "I feel sad and lonely today...",
    "I need calm music for studying and focus",
    "I'm pumped and energetic for my workout!",
    "This mystery novel has me intrigued and curious",
    "I love you so much my darling",
];

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("No music generator is configured")]
    GeneratorUnavailable,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub mood_profile: MoodProfile,
    pub music_parameters: MusicParameters,
}

#[derive(Debug, Clone)]
pub struct RenderedClip {
    pub wav: Vec<u8>,
    pub sampling_rate: u32,
    pub generation_secs: f64,
}

pub struct Composer {
    analyzer: MoodAnalyzer,
    generator: Option<Arc<dyn MusicGenerator>>,
    settings: GenerationSettings,
}

impl Composer {
    pub fn new(
        analyzer: MoodAnalyzer,
        generator: Option<Arc<dyn MusicGenerator>>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            analyzer,
            generator,
            settings,
        }
    }

    pub fn can_generate(&self) -> bool {
        self.generator.is_some()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub async fn compose(&self, text: &str) -> Composition {
        let mood_profile = self.analyzer.analyze(text).await;
        let music_parameters = get_music_parameters(&mood_profile);
        Composition {
            mood_profile,
            music_parameters,
        }
    }

    /// Generates a clip for `composition`.
    /// `fallback_text` is sent as the prompt if the composition has none.
    pub async fn render(
        &self,
        composition: &Composition,
        fallback_text: &str,
        seed: Option<u64>,
    ) -> Result<RenderedClip, ComposeError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(ComposeError::GeneratorUnavailable)?;

        let prompt = match composition.music_parameters.generation_prompt.trim() {
            "" => fallback_text.trim().to_string(),
            prompt => prompt.to_string(),
        };
        let request = GenerationRequest {
            prompt,
            settings: self.settings.clone(),
            seed,
        };

        let start = Instant::now();
        let audio = generator.generate(&request).await.map_err(|err| {
            warn!("Music generation failed: {}", err);
            err
        })?;
        let wav = prepare_clip(&audio)?;
        let generation_secs = start.elapsed().as_secs_f64();

        info!(
            "Generated {} bytes of {} audio in {:.2}s",
            wav.len(),
            composition.mood_profile.mood,
            generation_secs
        );

        Ok(RenderedClip {
            wav,
            sampling_rate: audio.sampling_rate,
            generation_secs,
        })
    }
}
