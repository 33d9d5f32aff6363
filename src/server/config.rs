use super::RequestsLoggingLevel;
use crate::config::DEFAULT_MAX_TEXT_LENGTH;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Longest accepted input text, in characters.
    pub max_text_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            frontend_dir_path: None,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}
