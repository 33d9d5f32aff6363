use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub max_text_length: Option<usize>,

    // Collaborators
    pub sentiment_url: Option<String>,
    pub sentiment_timeout_sec: Option<u64>,
    pub sentiment_api_token: Option<String>,
    pub musicgen_url: Option<String>,
    pub musicgen_timeout_sec: Option<u64>,
    pub musicgen_api_token: Option<String>,

    pub generation: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub duration_secs: Option<u32>,
    pub tokens_per_second: Option<u32>,
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub guidance_scale: Option<f32>,
    pub sampling_rate: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
