use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use melodai_server::composer::Composer;
use melodai_server::config::{AppConfig, CliConfig, FileConfig};
use melodai_server::generation::{HttpMusicGenerator, MusicGenerator};
use melodai_server::mood::MoodAnalyzer;
use melodai_server::sentiment::{
    HttpSentimentClassifier, NoOpSentimentClassifier, SentimentClassifier,
};
use melodai_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use melodai_server::user::{SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the user database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Longest accepted input text, in characters.
    #[clap(long)]
    pub max_text_length: Option<usize>,

    /// URL of the text-classification endpoint used for sentiment.
    #[clap(long)]
    pub sentiment_url: Option<String>,

    #[clap(long, default_value_t = 10)]
    pub sentiment_timeout_sec: u64,

    /// URL of the text-to-audio endpoint. Without it only analysis is available.
    #[clap(long)]
    pub musicgen_url: Option<String>,

    #[clap(long, default_value_t = 300)]
    pub musicgen_timeout_sec: u64,

    /// Length of generated clips in seconds.
    #[clap(long)]
    pub duration_secs: Option<u32>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            max_text_length: self.max_text_length,
            sentiment_url: self.sentiment_url.clone(),
            sentiment_timeout_sec: self.sentiment_timeout_sec,
            musicgen_url: self.musicgen_url.clone(),
            musicgen_timeout_sec: self.musicgen_timeout_sec,
            duration_secs: self.duration_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let classifier: Arc<dyn SentimentClassifier> = match &config.sentiment {
        Some(sentiment) => {
            info!("Using sentiment endpoint {}", sentiment.url);
            Arc::new(HttpSentimentClassifier::new(
                sentiment.url.clone(),
                sentiment.api_token.clone(),
                sentiment.timeout_sec,
            )?)
        }
        None => {
            warn!("No sentiment endpoint configured, every text is treated as neutral");
            Arc::new(NoOpSentimentClassifier)
        }
    };

    let generator: Option<Arc<dyn MusicGenerator>> = match &config.musicgen {
        Some(musicgen) => {
            info!("Using music generation endpoint {}", musicgen.url);
            Some(Arc::new(HttpMusicGenerator::new(
                musicgen.url.clone(),
                musicgen.api_token.clone(),
                musicgen.timeout_sec,
            )?))
        }
        None => {
            warn!("No music generation endpoint configured, generation is disabled");
            None
        }
    };

    let composer = Composer::new(
        MoodAnalyzer::new(classifier),
        generator,
        config.generation.clone(),
    );

    let user_db_path = config.user_db_path();
    info!("Opening user database at {:?}...", user_db_path);
    let user_store = SqliteUserStore::new(&user_db_path)?;
    let user_manager = UserManager::new(Arc::new(user_store));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        frontend_dir_path: config.frontend_dir_path.clone(),
        max_text_length: config.max_text_length,
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(server_config, Arc::new(user_manager), Arc::new(composer)).await
}
