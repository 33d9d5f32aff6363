use anyhow::{Context, Result};
use std::{net::SocketAddr, time::Duration};
use tracing::{debug, info};

use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use super::compose_routes::make_compose_routes;
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::state::{GuardedComposer, GuardedUserManager, ServerState};
use super::user_routes::make_user_routes;
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
    pub generator_available: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize)]
struct RegisterBody {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    user_id: usize,
}

#[derive(Deserialize)]
struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
    name: String,
}

#[derive(Serialize)]
struct SessionResponse {
    user_id: usize,
    email: String,
    name: String,
}

#[derive(Deserialize)]
struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
        generator_available: state.composer.can_generate(),
    };
    Json(stats)
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<RegisterBody>,
) -> Response {
    match user_manager.register(&body.email, &body.name, &body.password) {
        Ok(user_id) => (StatusCode::CREATED, Json(RegisterResponse { user_id })).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called for {}", body.email);
    let (auth_token, profile) = match user_manager.login(&body.email, &body.password) {
        Ok(x) => x,
        Err(err) => return err.into_response(),
    };

    let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, auth_token.value.0.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    let response_body = LoginSuccessResponse {
        token: auth_token.value.0,
        name: profile.name,
    };
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(response_body),
    )
        .into_response()
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    if let Err(err) = user_manager.logout(&session.token_value()) {
        return err.into_response();
    }
    let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, ""))
        .path("/")
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
        .same_site(SameSite::Lax)
        .build();
    (StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]).into_response()
}

async fn get_session(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    match user_manager.get_profile(session.user_id) {
        Ok(profile) => Json(SessionResponse {
            user_id: profile.id,
            email: profile.email,
            name: profile.name,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn change_password(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
    Json(body): Json<ChangePasswordBody>,
) -> Response {
    match user_manager.change_password(
        session.user_id,
        &body.current_password,
        &body.new_password,
        &session.token_value(),
    ) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_app(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    composer: GuardedComposer,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), user_manager, composer);

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/session", get(get_session))
        .route("/change-password", post(change_password))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/compose", make_compose_routes(state.clone()))
        .nest("/v1/user", make_user_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    composer: GuardedComposer,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, user_manager, composer)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on {}", addr);

    Ok(axum::serve(listener, app).await?)
}
