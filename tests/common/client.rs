//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for all server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as the regular test user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_EMAIL, TEST_PASS).await
    }

    /// Creates a client logged in as the second test user
    pub async fn authenticated_other(base_url: String) -> Self {
        Self::authenticated_as(base_url, OTHER_EMAIL, OTHER_PASS).await
    }

    async fn authenticated_as(base_url: String, email: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(email, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of {} failed: {:?}",
            email,
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/register
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Response {
        self.client
            .post(self.url("/v1/auth/register"))
            .json(&json!({
                "email": email,
                "name": name,
                "password": password,
            }))
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /v1/auth/login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/v1/auth/login"))
            .json(&json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(self.url("/v1/auth/logout"))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /v1/auth/session
    pub async fn get_session(&self) -> Response {
        self.client
            .get(self.url("/v1/auth/session"))
            .send()
            .await
            .expect("Session request failed")
    }

    /// POST /v1/auth/change-password
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Response {
        self.client
            .post(self.url("/v1/auth/change-password"))
            .json(&json!({
                "current_password": current_password,
                "new_password": new_password,
            }))
            .send()
            .await
            .expect("Change password request failed")
    }

    // ========================================================================
    // Compose Endpoints
    // ========================================================================

    /// GET /v1/compose/examples
    pub async fn get_examples(&self) -> Response {
        self.client
            .get(self.url("/v1/compose/examples"))
            .send()
            .await
            .expect("Examples request failed")
    }

    /// POST /v1/compose/analyze
    pub async fn analyze(&self, text: &str) -> Response {
        self.client
            .post(self.url("/v1/compose/analyze"))
            .json(&json!({ "text": text }))
            .send()
            .await
            .expect("Analyze request failed")
    }

    /// POST /v1/compose/parameters
    pub async fn get_parameters(&self, mood_profile: serde_json::Value) -> Response {
        self.client
            .post(self.url("/v1/compose/parameters"))
            .json(&mood_profile)
            .send()
            .await
            .expect("Parameters request failed")
    }

    /// POST /v1/compose/generate
    pub async fn generate(&self, text: &str) -> Response {
        self.client
            .post(self.url("/v1/compose/generate"))
            .json(&json!({ "text": text }))
            .send()
            .await
            .expect("Generate request failed")
    }

    /// Generates a clip and returns the new history entry id.
    pub async fn generate_entry(&self, text: &str) -> usize {
        let response = self.generate(text).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let entry: serde_json::Value = response.json().await.expect("Invalid history entry");
        entry["id"].as_u64().expect("History entry without id") as usize
    }

    // ========================================================================
    // User Endpoints
    // ========================================================================

    /// GET /v1/user/profile
    pub async fn get_profile(&self) -> Response {
        self.client
            .get(self.url("/v1/user/profile"))
            .send()
            .await
            .expect("Get profile request failed")
    }

    /// PUT /v1/user/profile
    pub async fn update_profile(&self, body: serde_json::Value) -> Response {
        self.client
            .put(self.url("/v1/user/profile"))
            .json(&body)
            .send()
            .await
            .expect("Update profile request failed")
    }

    /// GET /v1/user/history with raw query parameters
    pub async fn get_history(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/v1/user/history"))
            .query(query)
            .send()
            .await
            .expect("Get history request failed")
    }

    /// GET /v1/user/history/{id}
    pub async fn get_history_entry(&self, id: usize) -> Response {
        self.client
            .get(self.url(&format!("/v1/user/history/{}", id)))
            .send()
            .await
            .expect("Get history entry request failed")
    }

    /// DELETE /v1/user/history/{id}
    pub async fn delete_history_entry(&self, id: usize) -> Response {
        self.client
            .delete(self.url(&format!("/v1/user/history/{}", id)))
            .send()
            .await
            .expect("Delete history entry request failed")
    }

    /// GET /v1/user/history/{id}/audio
    pub async fn get_history_audio(&self, id: usize) -> Response {
        self.client
            .get(self.url(&format!("/v1/user/history/{}/audio", id)))
            .send()
            .await
            .expect("Get history audio request failed")
    }

    /// PUT /v1/user/history/{id}/favorite
    pub async fn set_favorite(&self, id: usize, favorite: bool) -> Response {
        self.client
            .put(self.url(&format!("/v1/user/history/{}/favorite", id)))
            .json(&json!({ "favorite": favorite }))
            .send()
            .await
            .expect("Set favorite request failed")
    }

    /// POST /v1/user/history/{id}/tags
    pub async fn add_tags(&self, id: usize, tags: &[&str]) -> Response {
        self.client
            .post(self.url(&format!("/v1/user/history/{}/tags", id)))
            .json(&json!({ "tags": tags }))
            .send()
            .await
            .expect("Add tags request failed")
    }
}
