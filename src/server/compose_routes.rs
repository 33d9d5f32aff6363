use super::error_responses::{check_text_length, error_response};
use super::session::Session;
use super::state::ServerState;
use crate::composer::EXAMPLE_INPUTS;
use crate::music::PartialMoodProfile;
use crate::user::NewHistoryEntry;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize, Debug)]
struct AnalyzeBody {
    pub text: String,
}

#[derive(Deserialize, Debug)]
struct GenerateBody {
    pub text: String,
    pub seed: Option<u64>,
}

async fn get_examples() -> impl IntoResponse {
    Json(EXAMPLE_INPUTS)
}

async fn analyze(
    _session: Session,
    State(state): State<ServerState>,
    Json(body): Json<AnalyzeBody>,
) -> Response {
    if let Err(response) = check_text_length(&body.text, state.config.max_text_length) {
        return response;
    }
    Json(state.composer.compose(&body.text).await).into_response()
}

async fn parameters(_session: Session, Json(profile): Json<PartialMoodProfile>) -> Response {
    Json(profile.music_parameters()).into_response()
}

async fn generate(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<GenerateBody>,
) -> Response {
    let text = body.text.trim();
    if text.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Text cannot be empty.");
    }
    if let Err(response) = check_text_length(text, state.config.max_text_length) {
        return response;
    }

    let composition = state.composer.compose(text).await;
    let clip = match state.composer.render(&composition, text, body.seed).await {
        Ok(clip) => clip,
        Err(err) => return err.into_response(),
    };
    debug!(
        "Rendered {}Hz clip for user {}",
        clip.sampling_rate, session.user_id
    );

    let entry = NewHistoryEntry {
        input_text: text.to_string(),
        mood_profile: composition.mood_profile,
        music_parameters: composition.music_parameters,
        audio: clip.wav,
        generation_secs: clip.generation_secs,
    };
    match state.user_manager.save_generation(session.user_id, entry) {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_compose_routes(state: ServerState) -> Router {
    Router::new()
        .route("/examples", get(get_examples))
        .route("/analyze", post(analyze))
        .route("/parameters", post(parameters))
        .route("/generate", post(generate))
        .with_state(state)
}
