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

/// Adds a caller to a lobby.
///
/// The expiry check, the capacity check, the membership insert and the
/// status flip run in one transaction, so two racing joins cannot both
/// take the last slot. The unique (lobby_id, anon_token) constraint
/// turns a racing duplicate join into AlreadyJoined instead of a second
/// row.
pub async fn join(
    pool: &SqlitePool,
    id: &str,
    anon_token: &str,
    nickname: &str,
) -> AppResult<Participant> {
    validate_nickname(nickname)?;

    let mut tx = pool.begin().await?;
    let lobby = super::fetch(&mut *tx, id).await?;
    if lobby.is_expired() {
        return Err(AppError::LobbyExpired);
    }

    let count = participants::PUBLIC.count(&mut *tx, id).await?;
    if count >= lobby.max_participants {
        return Err(AppError::LobbyFull);
    }

    let participant = match participants::PUBLIC
        .insert(&mut *tx, id, anon_token, nickname)
        .await
    {
        Ok(participant) => participant,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::AlreadyJoined);
        }
        Err(err) => return Err(err.into()),
    };

    if count + 1 >= lobby.max_participants {
        sqlx::query("UPDATE public_lobbies SET status = ? WHERE id = ?")
            .bind(LobbyStatus::Full.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(lobby_id = %id, participants = count + 1, "participant joined public lobby");
    Ok(participant)
}

/// Removes a caller from a lobby, reopening it when a full lobby drops
/// below capacity.
pub async fn leave(pool: &SqlitePool, id: &str, anon_token: &str) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    let lobby = super::fetch(&mut *tx, id).await?;

    if !participants::PUBLIC.remove(&mut *tx, id, anon_token).await? {
        return Err(AppError::NotAMember);
    }

    // the departure just made room
    if lobby.status == LobbyStatus::Full.as_str() {
        sqlx::query("UPDATE public_lobbies SET status = ? WHERE id = ?")
            .bind(LobbyStatus::Active.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(lobby_id = %id, "participant left public lobby");
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
    Path(id): Path<Uuid>,
    AnonIdentity(token): AnonIdentity,
    body: Option<Json<JoinBody>>,
) -> AppResult<impl IntoResponse> {
    let JoinBody { nickname } = body.map(|Json(body)| body).unwrap_or_default();
    let id = id.to_string();

    let participant = join(&db_pool, &id, &token, &nickname).await?;
    let lobby = super::fetch_detail(&db_pool, &id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Successfully joined lobby",
            "participant_id": participant.id,
            "lobby": lobby,
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
