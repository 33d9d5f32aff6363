//! End-to-end tests for the per-user generation history and profile

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::json;

fn entry_ids(page: &serde_json::Value) -> Vec<u64> {
    page["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_history_lists_newest_first() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let happy = client.generate_entry(HAPPY_TEXT).await as u64;
    let sad = client.generate_entry(SAD_TEXT).await as u64;
    let calm = client.generate_entry(CALM_TEXT).await as u64;

    let response = client.get_history(&[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["total"], 3);
    assert_eq!(entry_ids(&page), vec![calm, sad, happy]);

    let page: serde_json::Value = client
        .get_history(&[("sort", "oldest")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(entry_ids(&page), vec![happy, sad, calm]);
}

#[tokio::test]
async fn test_history_pagination() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let mut ids = Vec::new();
    for text in [HAPPY_TEXT, SAD_TEXT, CALM_TEXT] {
        ids.push(client.generate_entry(text).await as u64);
    }
    ids.reverse();

    let page: serde_json::Value = client
        .get_history(&[("limit", "2")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 3);
    assert_eq!(entry_ids(&page), ids[..2].to_vec());

    let page: serde_json::Value = client
        .get_history(&[("limit", "2"), ("offset", "2")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 3);
    assert_eq!(entry_ids(&page), ids[2..].to_vec());

    // Page size zero is raised to one
    let page: serde_json::Value = client
        .get_history(&[("limit", "0")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(entry_ids(&page).len(), 1);
}

#[tokio::test]
async fn test_history_filters() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let happy = client.generate_entry(HAPPY_TEXT).await;
    let sad = client.generate_entry(SAD_TEXT).await as u64;
    client.generate_entry(CALM_TEXT).await;

    let page: serde_json::Value = client
        .get_history(&[("mood", "sad")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(entry_ids(&page), vec![sad]);

    let page: serde_json::Value = client
        .get_history(&[("search", "WEEKEND")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(entry_ids(&page), vec![happy as u64]);

    // Search also matches the detected mood
    let page: serde_json::Value = client
        .get_history(&[("search", "calm")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 1);

    let page: serde_json::Value = client
        .get_history(&[("search", "100%")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 0);

    client.set_favorite(happy, true).await;
    let page: serde_json::Value = client
        .get_history(&[("favorites", "true")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(entry_ids(&page), vec![happy as u64]);

    let response = client.get_history(&[("mood", "grumpy")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_is_private_to_each_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;
    let other = TestClient::authenticated_other(server.base_url.clone()).await;

    let id = client.generate_entry(HAPPY_TEXT).await;

    let page: serde_json::Value = other.get_history(&[]).await.json().await.unwrap();
    assert_eq!(page["total"], 0);

    assert_eq!(
        other.get_history_entry(id).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        other.get_history_audio(id).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        other.set_favorite(id, true).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        other.add_tags(id, &["mine"]).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        other.delete_history_entry(id).await.status(),
        StatusCode::NOT_FOUND
    );

    let entry: serde_json::Value = client.get_history_entry(id).await.json().await.unwrap();
    assert_eq!(entry["favorite"], false);
    assert_eq!(entry["tags"], json!([]));
    assert_eq!(entry["play_count"], 0);
}

#[tokio::test]
async fn test_audio_playback_is_counted() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let id = client.generate_entry(CALM_TEXT).await;
    for _ in 0..2 {
        let response = client.get_history_audio(id).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let entry: serde_json::Value = client.get_history_entry(id).await.json().await.unwrap();
    assert_eq!(entry["play_count"], 2);
    assert!(entry["last_played"].as_i64().is_some());
}

#[tokio::test]
async fn test_favorite_and_tags() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let id = client.generate_entry(SAD_TEXT).await;

    let response = client.set_favorite(id, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let entry: serde_json::Value = response.json().await.unwrap();
    assert_eq!(entry["favorite"], true);

    let entry: serde_json::Value = client.set_favorite(id, false).await.json().await.unwrap();
    assert_eq!(entry["favorite"], false);

    let response = client.add_tags(id, &["rainy", " piano ", ""]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let tags: Vec<String> = response.json().await.unwrap();
    assert_eq!(tags, vec!["rainy", "piano"]);

    let tags: Vec<String> = client
        .add_tags(id, &["piano", "night"])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(tags, vec!["rainy", "piano", "night"]);

    let entry: serde_json::Value = client.get_history_entry(id).await.json().await.unwrap();
    assert_eq!(entry["tags"], json!(["rainy", "piano", "night"]));
}

#[tokio::test]
async fn test_delete_history_entry() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let id = client.generate_entry(HAPPY_TEXT).await;
    assert_eq!(
        client.delete_history_entry(id).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        client.delete_history_entry(id).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.get_history_entry(id).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.get_history_audio(id).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_update_profile() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client
        .update_profile(json!({"name": "  Renamed  ", "preferences": {"theme": "dark"}}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: serde_json::Value = response.json().await.unwrap();
    assert_eq!(profile["name"], "Renamed");
    assert_eq!(profile["email"], TEST_EMAIL);
    assert_eq!(profile["preferences"], json!({"theme": "dark"}));

    // Omitted fields are left alone
    let profile: serde_json::Value = client
        .update_profile(json!({"preferences": {"duration": 8}}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(profile["name"], "Renamed");
    assert_eq!(profile["preferences"], json!({"duration": 8}));

    let response = client.update_profile(json!({"name": " "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.update_profile(json!({"preferences": [1, 2]})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let profile: serde_json::Value = client.get_profile().await.json().await.unwrap();
    assert_eq!(profile["name"], "Renamed");
}
