//! User data models

use crate::mood::{Mood, MoodProfile};
use crate::music::MusicParameters;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 20;
pub const MAX_HISTORY_PAGE_SIZE: usize = 100;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: usize,
    pub email: String,
    pub name: String,
    /// Unix seconds.
    pub created: i64,
    pub last_login: Option<i64>,
    pub preferences: serde_json::Value,
}

/// A freshly generated clip, ready to be stored.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub input_text: String,
    pub mood_profile: MoodProfile,
    pub music_parameters: MusicParameters,
    pub audio: Vec<u8>,
    pub generation_secs: f64,
}

/// A stored generation, without its audio.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: usize,
    pub user_id: usize,
    pub input_text: String,
    pub mood_profile: MoodProfile,
    pub music_parameters: MusicParameters,
    pub generation_secs: f64,
    pub audio_size: usize,
    pub created: i64,
    pub favorite: bool,
    pub play_count: u32,
    pub last_played: Option<i64>,
    pub tags: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistorySort {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    /// Case-insensitive match against the input text or the mood.
    pub search: Option<String>,
    pub mood: Option<Mood>,
    pub favorites_only: bool,
    pub sort: HistorySort,
    pub limit: usize,
    pub offset: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            search: None,
            mood: None,
            favorites_only: false,
            sort: HistorySort::Newest,
            limit: DEFAULT_HISTORY_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl HistoryQuery {
    /// Drops blank searches and keeps the page size within bounds.
    pub fn normalized(mut self) -> Self {
        self.search = self
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        self.limit = self.limit.clamp(1, MAX_HISTORY_PAGE_SIZE);
        self
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// Number of entries matching the filters, ignoring pagination.
    pub total: usize,
    pub entries: Vec<HistoryEntry>,
}
