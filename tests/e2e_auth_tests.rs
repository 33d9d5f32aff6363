//! End-to-end tests for registration, login and sessions

mod common;

use common::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_EMAIL, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("Missing session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session_token="));
    assert!(set_cookie.contains("HttpOnly"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], TEST_NAME);
    assert!(!body["token"].as_str().unwrap().is_empty());

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);
    let session: serde_json::Value = response.json().await.unwrap();
    assert_eq!(session["email"], TEST_EMAIL);
    assert_eq!(session["name"], TEST_NAME);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_EMAIL, "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client.login("nobody@example.com", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_ignores_email_case() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("  TEST@Example.com ", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_then_login() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .register("newcomer@example.com", "Newcomer", "newcomer-pass")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["user_id"].as_u64().is_some());

    let response = client.login("newcomer@example.com", "newcomer-pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client.get_profile().await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: serde_json::Value = response.json().await.unwrap();
    assert_eq!(profile["name"], "Newcomer");
    assert_eq!(profile["preferences"], serde_json::json!({}));
    assert!(profile["last_login"].as_i64().is_some());
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.register(TEST_EMAIL, "Again", "another-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.register("not-an-email", "Someone", "some-pass").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some());

    let response = client.register("short@example.com", "Short", "12345").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.register("blank@example.com", "   ", "blank-pass").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_profile().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get_profile().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_authorization_header_is_accepted() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_EMAIL, TEST_PASS).await;
    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    let bare = reqwest::Client::new();
    for value in [token.clone(), format!("Bearer {}", token)] {
        let response = bare
            .get(format!("{}/v1/user/profile", server.base_url))
            .header(reqwest::header::AUTHORIZATION, value)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_change_password_revokes_other_sessions() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;
    let other_device = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.change_password("wrong-password", "brand-new-pass").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client.change_password(TEST_PASS, "tiny").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.change_password(TEST_PASS, "brand-new-pass").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(client.get_session().await.status(), StatusCode::OK);
    assert_eq!(
        other_device.get_session().await.status(),
        StatusCode::FORBIDDEN
    );

    let fresh = TestClient::new(server.base_url.clone());
    assert_eq!(
        fresh.login(TEST_EMAIL, TEST_PASS).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        fresh.login(TEST_EMAIL, "brand-new-pass").await.status(),
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn test_home_reports_session_and_generator() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats: serde_json::Value = response.json().await.unwrap();
    assert!(stats["session_token"].as_str().is_some());
    assert_eq!(stats["generator_available"], true);

    let server = TestServer::spawn_without_generator().await;
    let client = TestClient::new(server.base_url.clone());
    let stats: serde_json::Value = client.get_home().await.json().await.unwrap();
    assert!(stats["session_token"].is_null());
    assert_eq!(stats["generator_available"], false);
}
