use crate::composer::ComposeError;
use crate::generation::GenerationError;
use crate::user::UserManagerError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for UserManagerError {
    fn into_response(self) -> Response {
        match self {
            UserManagerError::InvalidInput(message) => {
                error_response(StatusCode::BAD_REQUEST, message)
            }
            UserManagerError::EmailTaken => error_response(StatusCode::CONFLICT, self.to_string()),
            UserManagerError::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, self.to_string())
            }
            UserManagerError::NotFound => StatusCode::NOT_FOUND.into_response(),
            UserManagerError::Internal(err) => {
                error!("Internal user error: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl IntoResponse for ComposeError {
    fn into_response(self) -> Response {
        match self {
            ComposeError::GeneratorUnavailable => {
                error_response(StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ComposeError::Generation(GenerationError::Encoding(err)) => {
                error!("Failed to encode generated audio: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            ComposeError::Generation(err) => {
                warn!("Music generation failed: {}", err);
                error_response(StatusCode::BAD_GATEWAY, err.to_string())
            }
        }
    }
}

/// Rejects text longer than `max_chars` characters.
pub fn check_text_length(text: &str, max_chars: usize) -> Result<(), Response> {
    let length = text.chars().count();
    if length > max_chars {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "Text is {} characters long, the maximum is {}.",
                length, max_chars
            ),
        ));
    }
    Ok(())
}
