use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use clap::Parser;
use std::io::Read;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use melodai_server::mood::{mood_scores, MoodAnalyzer, Sentiment, SentimentScore};
use melodai_server::music::get_music_parameters;
use melodai_server::sentiment::{HttpSentimentClassifier, SentimentClassifier, SentimentError};

fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

/// Prints the mood profile and music parameters inferred from a text.
#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// The text to analyze, read from stdin when omitted.
    pub text: Option<String>,

    /// Sentiment label to assume instead of asking a classifier.
    #[clap(long)]
    pub sentiment: Option<Sentiment>,

    #[clap(long, default_value_t = 0.5)]
    pub sentiment_confidence: f64,

    /// Classify the text with this endpoint, overrides --sentiment.
    #[clap(long)]
    pub sentiment_url: Option<String>,

    /// Bearer token for the sentiment endpoint.
    #[clap(long)]
    pub sentiment_api_token: Option<String>,

    #[clap(long, default_value_t = 10)]
    pub sentiment_timeout_sec: u64,

    /// Also print the raw keyword score of every mood.
    #[clap(long)]
    pub scores: bool,
}

struct FixedSentimentClassifier(SentimentScore);

#[async_trait]
impl SentimentClassifier for FixedSentimentClassifier {
    async fn classify(&self, _text: &str) -> Result<SentimentScore, SentimentError> {
        Ok(self.0)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let text = match cli_args.text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    let classifier: Arc<dyn SentimentClassifier> = match cli_args.sentiment_url {
        Some(url) => Arc::new(HttpSentimentClassifier::new(
            url,
            cli_args.sentiment_api_token,
            cli_args.sentiment_timeout_sec,
        )?),
        None => {
            let score = match cli_args.sentiment {
                Some(label) => SentimentScore::new(label, cli_args.sentiment_confidence),
                None => SentimentScore::neutral_fallback(),
            };
            Arc::new(FixedSentimentClassifier(score))
        }
    };

    let mood_profile = MoodAnalyzer::new(classifier).analyze(&text).await;
    let music_parameters = get_music_parameters(&mood_profile);

    let mut output = serde_json::json!({
        "mood_profile": mood_profile,
        "music_parameters": music_parameters,
    });
    if cli_args.scores {
        let scores: serde_json::Map<String, serde_json::Value> = mood_scores(&text)
            .into_iter()
            .map(|(mood, score)| (mood.to_string(), serde_json::json!(score)))
            .collect();
        output["scores"] = serde_json::Value::Object(scores);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
