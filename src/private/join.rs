use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::anon::AnonIdentity;
use crate::participants::{self, Participant, validate_nickname};
use crate::{AppError, AppResult, AppState, LobbyStatus};

use super::PrivateLobby;

/// Joins a lobby through its shareable code. Same transactional shape as
/// the public join: expiry gate, capacity gate, insert and status flip
/// are atomic.
pub async fn join_by_code(
    pool: &SqlitePool,
    code: &str,
    anon_token: &str,
    nickname: &str,
) -> AppResult<(PrivateLobby, Participant)> {
    validate_nickname(nickname)?;

    let mut tx = pool.begin().await?;
    let lobby = super::fetch_by_code(&mut *tx, code).await?;
    if lobby.is_expired() {
        return Err(AppError::LobbyExpired);
    }

    let count = participants::PRIVATE.count(&mut *tx, &lobby.id).await?;
    if count >= lobby.max_participants {
        return Err(AppError::LobbyFull);
    }

    let participant = match participants::PRIVATE
        .insert(&mut *tx, &lobby.id, anon_token, nickname)
        .await
    {
        Ok(participant) => participant,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::AlreadyJoined);
        }
        Err(err) => return Err(err.into()),
    };

    if count + 1 >= lobby.max_participants {
        sqlx::query("UPDATE private_lobbies SET status = ? WHERE id = ?")
            .bind(LobbyStatus::Full.as_str())
            .bind(&lobby.id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(lobby_id = %lobby.id, participants = count + 1, "participant joined private lobby");
    Ok((lobby, participant))
}

/// Removes a caller from a lobby. The creator cannot leave their own
/// lobby; they delete it instead, which archives it for everyone.
pub async fn leave(pool: &SqlitePool, id: &str, anon_token: &str) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    let lobby = super::fetch(&mut *tx, id).await?;
    if lobby.creator_token == anon_token {
        return Err(AppError::CreatorCannotLeave);
    }

    if !participants::PRIVATE.remove(&mut *tx, id, anon_token).await? {
        return Err(AppError::NotAMember);
    }

    if lobby.status == LobbyStatus::Full.as_str() {
        sqlx::query("UPDATE private_lobbies SET status = ? WHERE id = ?")
            .bind(LobbyStatus::Active.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(lobby_id = %id, "participant left private lobby");
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JoinBody {
    #[serde(default)]
    nickname: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn join_lobby(
    State(db_pool): State<SqlitePool>,
    Path(code): Path<String>,
    AnonIdentity(token): AnonIdentity,
    body: Option<Json<JoinBody>>,
) -> AppResult<impl IntoResponse> {
    let JoinBody { nickname } = body.map(|Json(body)| body).unwrap_or_default();

    let (lobby, participant) = join_by_code(&db_pool, &code, &token, &nickname).await?;
    let detail = super::fetch_detail(&db_pool, &lobby.id, &token).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Successfully joined lobby",
            "participant_id": participant.id,
            "lobby": detail,
        })),
    ))
}

#[debug_handler(state = AppState)]
pub(crate) async fn leave_lobby(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    AnonIdentity(token): AnonIdentity,
) -> AppResult<impl IntoResponse> {
    leave(&db_pool, &id.to_string(), &token).await?;
    Ok(Json(json!({ "message": "Successfully left lobby" })))
}
