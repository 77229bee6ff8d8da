use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use sqlx::SqlitePool;

use crate::anon::AnonIdentity;
use crate::{AppError, AppResult, AppState};

use super::LobbyDetail;

/// Code-based lookup, the only way in without being the creator.
pub async fn fetch_detail_by_code(
    pool: &SqlitePool,
    code: &str,
    viewer: &str,
) -> AppResult<LobbyDetail> {
    let lobby = super::fetch_by_code(pool, code).await?;
    if lobby.is_expired() {
        return Err(AppError::LobbyExpired);
    }
    super::fetch_detail(pool, &lobby.id, viewer).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn lobby_by_code(
    State(db_pool): State<SqlitePool>,
    Path(code): Path<String>,
    AnonIdentity(token): AnonIdentity,
) -> AppResult<impl IntoResponse> {
    let detail = fetch_detail_by_code(&db_pool, &code, &token).await?;
    Ok(Json(detail))
}
