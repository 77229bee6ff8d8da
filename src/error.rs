use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Every way a request can fail. All failures are terminal for their
/// request; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unknown game '{0}'")]
    InvalidGame(String),

    #[error("invalid rank '{rank}' for game '{game}'")]
    InvalidRank { game: String, rank: String },

    #[error("{0}")]
    Validation(String),

    #[error("lobby is full")]
    LobbyFull,

    #[error("lobby has expired")]
    LobbyExpired,

    #[error("you have already joined this lobby")]
    AlreadyJoined,

    #[error("you are not in this lobby")]
    NotAMember,

    #[error("creator cannot leave their own lobby, delete it instead")]
    CreatorCannotLeave,

    #[error("only the creator can delete this lobby")]
    NotCreator,

    #[error("lobby not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidGame(_) | AppError::InvalidRank { .. } | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::LobbyFull | AppError::AlreadyJoined => StatusCode::CONFLICT,
            AppError::LobbyExpired => StatusCode::GONE,
            AppError::NotAMember | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::CreatorCannotLeave | AppError::NotCreator => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
