use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::anon::AnonIdentity;
use crate::{AppError, AppResult, AppState, LOBBY_LIFETIME_SECS, LobbyStatus, now_ts, participants};

use super::{DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY, PrivateLobby, generate_code};

#[derive(Debug, Default, Deserialize)]
pub struct CreateLobby {
    pub max_participants: Option<i64>,
}

/// Creates a private lobby and seats its creator as the first member.
///
/// The code is drawn repeatedly until unused. The check and the insert
/// share the creation transaction, and the single write connection means
/// no other request can claim the code in between.
pub async fn create(
    pool: &SqlitePool,
    creator_token: &str,
    req: &CreateLobby,
) -> AppResult<PrivateLobby> {
    let max_participants = req.max_participants.unwrap_or(DEFAULT_CAPACITY);
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&max_participants) {
        return Err(AppError::Validation(format!(
            "private lobbies hold between {MIN_CAPACITY} and {MAX_CAPACITY} participants"
        )));
    }

    let mut tx = pool.begin().await?;

    let lobby_code = loop {
        let code = generate_code();
        let taken: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM private_lobbies WHERE lobby_code = ?")
                .bind(&code)
                .fetch_optional(&mut *tx)
                .await?;
        if taken.is_none() {
            break code;
        }
    };

    let now = now_ts();
    let lobby = PrivateLobby {
        id: Uuid::now_v7().to_string(),
        creator_token: creator_token.to_owned(),
        max_participants,
        status: LobbyStatus::Active.as_str().to_owned(),
        lobby_code,
        created_at: now,
        expires_at: now + LOBBY_LIFETIME_SECS,
    };

    sqlx::query(
        "INSERT INTO private_lobbies
         (id, creator_token, max_participants, status, lobby_code, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&lobby.id)
    .bind(&lobby.creator_token)
    .bind(lobby.max_participants)
    .bind(&lobby.status)
    .bind(&lobby.lobby_code)
    .bind(lobby.created_at)
    .bind(lobby.expires_at)
    .execute(&mut *tx)
    .await?;

    // creator takes the first slot, nickname can come later
    participants::PRIVATE
        .insert(&mut *tx, &lobby.id, creator_token, "")
        .await?;

    tx.commit().await?;

    tracing::info!(lobby_id = %lobby.id, code = %lobby.lobby_code, "private lobby created");
    Ok(lobby)
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_lobby(
    State(db_pool): State<SqlitePool>,
    AnonIdentity(token): AnonIdentity,
    body: Option<Json<CreateLobby>>,
) -> AppResult<impl IntoResponse> {
    let req = body.map(|Json(body)| body).unwrap_or_default();
    let lobby = create(&db_pool, &token, &req).await?;
    let detail = super::fetch_detail(&db_pool, &lobby.id, &token).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lobby created successfully",
            "lobby_code": lobby.lobby_code,
            "lobby": detail,
        })),
    ))
}
