mod file_config;

pub use file_config::{FileConfig, GenerationConfig};

use crate::generation::GenerationSettings;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_MAX_TEXT_LENGTH: usize = 500;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub max_text_length: Option<usize>,
    pub sentiment_url: Option<String>,
    pub sentiment_timeout_sec: u64,
    pub musicgen_url: Option<String>,
    pub musicgen_timeout_sec: u64,
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub max_text_length: usize,

    pub sentiment: Option<CollaboratorSettings>,
    pub musicgen: Option<CollaboratorSettings>,
    pub generation: GenerationSettings,
}

/// Location of a remote model endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CollaboratorSettings {
    pub url: String,
    pub api_token: Option<String>,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let max_text_length = file
            .max_text_length
            .or(cli.max_text_length)
            .unwrap_or(DEFAULT_MAX_TEXT_LENGTH);
        if max_text_length == 0 {
            bail!("max_text_length must be greater than zero");
        }

        let sentiment = file
            .sentiment_url
            .or_else(|| cli.sentiment_url.clone())
            .map(|url| CollaboratorSettings {
                url,
                api_token: file.sentiment_api_token,
                timeout_sec: file
                    .sentiment_timeout_sec
                    .unwrap_or(cli.sentiment_timeout_sec),
            });
        let musicgen = file
            .musicgen_url
            .or_else(|| cli.musicgen_url.clone())
            .map(|url| CollaboratorSettings {
                url,
                api_token: file.musicgen_api_token,
                timeout_sec: file
                    .musicgen_timeout_sec
                    .unwrap_or(cli.musicgen_timeout_sec),
            });

        let defaults = GenerationSettings::default();
        let gen_file = file.generation.unwrap_or_default();
        let generation = GenerationSettings {
            duration_secs: gen_file
                .duration_secs
                .or(cli.duration_secs)
                .unwrap_or(defaults.duration_secs),
            tokens_per_second: gen_file
                .tokens_per_second
                .unwrap_or(defaults.tokens_per_second),
            temperature: gen_file.temperature.unwrap_or(defaults.temperature),
            top_k: gen_file.top_k.unwrap_or(defaults.top_k),
            top_p: gen_file.top_p.unwrap_or(defaults.top_p),
            guidance_scale: gen_file.guidance_scale.unwrap_or(defaults.guidance_scale),
            sampling_rate: gen_file.sampling_rate.unwrap_or(defaults.sampling_rate),
        };
        if generation.duration_secs == 0 {
            bail!("generation duration_secs must be greater than zero");
        }
        if generation.sampling_rate == 0 {
            bail!("generation sampling_rate must be greater than zero");
        }

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            max_text_length,
            sentiment,
            musicgen,
            generation,
        })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
