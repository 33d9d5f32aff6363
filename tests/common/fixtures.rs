//! Test fixtures: user database and fake collaborators

use super::constants::*;
use anyhow::Result;
use async_trait::async_trait;
use melodai_server::generation::{GenerationError, GenerationRequest, MusicGenerator, RawAudio};
use melodai_server::user::{SqliteUserStore, UserManager};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary user database with the two test users registered.
/// Returns (temp_dir, db_path)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("user.db");

    let store = SqliteUserStore::new(&db_path)?;
    let user_manager = UserManager::new(Arc::new(store));
    user_manager.register(TEST_EMAIL, TEST_NAME, TEST_PASS)?;
    user_manager.register(OTHER_EMAIL, OTHER_NAME, OTHER_PASS)?;

    Ok((dir, db_path))
}

/// Answers every request with a short stereo sine wave, counting the calls.
#[derive(Default)]
pub struct SineWaveGenerator {
    pub calls: AtomicUsize,
}

impl SineWaveGenerator {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MusicGenerator for SineWaveGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawAudio, GenerationError> {
        assert!(!request.prompt.trim().is_empty());
        self.calls.fetch_add(1, Ordering::SeqCst);

        let channel: Vec<f32> = (0..TEST_SAMPLE_COUNT)
            .map(|i| {
                let t = i as f32 / TEST_SAMPLING_RATE as f32;
                0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();
        Ok(RawAudio {
            sampling_rate: TEST_SAMPLING_RATE,
            channels: vec![channel.clone(), channel],
        })
    }
}

/// Always fails as an unreachable remote model would.
pub struct FailingGenerator;

#[async_trait]
impl MusicGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<RawAudio, GenerationError> {
        Err(GenerationError::Status(503))
    }
}
