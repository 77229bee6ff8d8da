use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{debug_handler, response::IntoResponse};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::anon::AnonIdentity;
use crate::{AppError, AppResult, AppState, archive};

/// Archives and destroys a lobby. Creator only.
pub async fn delete(pool: &SqlitePool, id: &str, anon_token: &str) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    let lobby = super::fetch(&mut *tx, id).await?;
    if lobby.creator_token != anon_token {
        return Err(AppError::NotCreator);
    }

    archive::archive_public(&mut tx, &lobby).await?;
    tx.commit().await?;

    tracing::info!(lobby_id = %id, "public lobby archived and deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_lobby(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    AnonIdentity(token): AnonIdentity,
) -> AppResult<impl IntoResponse> {
    delete(&db_pool, &id.to_string(), &token).await?;
    Ok(StatusCode::NO_CONTENT)
}
