use super::error_responses::error_response;
use super::session::Session;
use super::state::{GuardedUserManager, ServerState};
use crate::mood::Mood;
use crate::user::{HistoryQuery, HistorySort, DEFAULT_HISTORY_PAGE_SIZE};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Deserialize, Debug)]
struct UpdateProfileBody {
    pub name: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug, Default)]
struct HistoryParams {
    pub search: Option<String>,
    pub mood: Option<String>,
    pub favorites: Option<bool>,
    pub sort: Option<HistorySort>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct FavoriteBody {
    pub favorite: bool,
}

#[derive(Deserialize, Debug)]
struct TagsBody {
    pub tags: Vec<String>,
}

impl HistoryParams {
    fn into_query(self) -> Result<HistoryQuery, String> {
        let mood = self
            .mood
            .filter(|m| !m.trim().is_empty())
            .map(|m| Mood::from_str(&m).map_err(|err| err.to_string()))
            .transpose()?;
        Ok(HistoryQuery {
            search: self.search,
            mood,
            favorites_only: self.favorites.unwrap_or(false),
            sort: self.sort.unwrap_or_default(),
            limit: self.limit.unwrap_or(DEFAULT_HISTORY_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        })
    }
}

async fn get_profile(session: Session, State(user_manager): State<GuardedUserManager>) -> Response {
    match user_manager.get_profile(session.user_id) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn put_profile(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<UpdateProfileBody>,
) -> Response {
    match user_manager.update_profile(
        session.user_id,
        body.name.as_deref(),
        body.preferences.as_ref(),
    ) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_history(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let query = match params.into_query() {
        Ok(query) => query,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };
    match user_manager.list_history(session.user_id, query) {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_history_entry(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<usize>,
) -> Response {
    match user_manager.get_history_entry(session.user_id, id) {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_history_entry(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<usize>,
) -> Response {
    match user_manager.delete_history_entry(session.user_id, id) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_history_audio(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<usize>,
) -> Response {
    let audio = match user_manager.play_history_audio(session.user_id, id) {
        Ok(audio) => audio,
        Err(err) => return err.into_response(),
    };
    let mime_type = infer::get(&audio)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    ([(header::CONTENT_TYPE, mime_type)], audio).into_response()
}

async fn put_history_favorite(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<usize>,
    Json(body): Json<FavoriteBody>,
) -> Response {
    match user_manager.set_history_favorite(session.user_id, id, body.favorite) {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn post_history_tags(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<usize>,
    Json(body): Json<TagsBody>,
) -> Response {
    match user_manager.add_history_tags(session.user_id, id, &body.tags) {
        Ok(tags) => Json(tags).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_user_routes(state: ServerState) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(put_profile))
        .route("/history", get(get_history))
        .route(
            "/history/{id}",
            get(get_history_entry).delete(delete_history_entry),
        )
        .route("/history/{id}/audio", get(get_history_audio))
        .route("/history/{id}/favorite", put(put_history_favorite))
        .route("/history/{id}/tags", post(post_history_tags))
        .with_state(state)
}
