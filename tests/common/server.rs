//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database.

use super::constants::*;
use super::fixtures::{create_test_db_with_users, FailingGenerator, SineWaveGenerator};
use melodai_server::composer::Composer;
use melodai_server::generation::{GenerationSettings, MusicGenerator};
use melodai_server::mood::MoodAnalyzer;
use melodai_server::sentiment::NoOpSentimentClassifier;
use melodai_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use melodai_server::user::{FullUserStore, SqliteUserStore, UserManager};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// User store for direct database access in tests
    pub user_store: Arc<dyn FullUserStore>,

    /// The fake generator, when the server was spawned with one
    pub generator: Option<Arc<SineWaveGenerator>>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port, generating sine waves.
    ///
    /// # Panics
    ///
    /// Panics if database creation, port binding or startup fails.
    pub async fn spawn() -> Self {
        let generator = Arc::new(SineWaveGenerator::default());
        Self::spawn_with(
            Some(generator.clone() as Arc<dyn MusicGenerator>),
            Some(generator),
        )
        .await
    }

    /// Spawns a server with no music generator configured.
    pub async fn spawn_without_generator() -> Self {
        Self::spawn_with(None, None).await
    }

    /// Spawns a server whose generator always fails.
    pub async fn spawn_with_failing_generator() -> Self {
        Self::spawn_with(Some(Arc::new(FailingGenerator)), None).await
    }

    async fn spawn_with(
        generator: Option<Arc<dyn MusicGenerator>>,
        sine_generator: Option<Arc<SineWaveGenerator>>,
    ) -> Self {
        let (temp_db_dir, db_path) =
            create_test_db_with_users().expect("Failed to create test database");

        let user_store: Arc<dyn FullUserStore> =
            Arc::new(SqliteUserStore::new(&db_path).expect("Failed to open user store"));
        let user_manager = Arc::new(UserManager::new(user_store.clone()));

        let composer = Arc::new(Composer::new(
            MoodAnalyzer::new(Arc::new(NoOpSentimentClassifier)),
            generator,
            GenerationSettings {
                duration_secs: 1,
                ..Default::default()
            },
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            max_text_length: TEST_MAX_TEXT_LENGTH,
        };
        let app = make_app(config, user_manager, composer).expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            user_store,
            generator: sine_generator,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
